//! API Routes Module
//!
//! 모든 HTTP 엔드포인트 정의
//!
//! # Routes
//! - `/health`, `/api/health` - 헬스 체크
//! - `/api/auth/*` - 관리자 로그인/로그아웃
//! - `/api/reservations/*` - 상담 신청
//! - `/api/reviews/*` - 수강 후기
//! - `/api/faqs`, `/api/admin/faqs` - 자주 묻는 질문
//! - `/api/settings*` - 사이트 설정
//! - `/api/recipients/*`, `/api/sms/*` - 문자 수신자/발송
//! - `/api/public/*` - 공개 페이지용 읽기 API
//! - `/api/admin/stats` - 관리자 대시보드 집계

pub mod admin;
pub mod auth;
pub mod faqs;
pub mod health;
pub mod public;
pub mod recipients;
pub mod reservations;
pub mod reviews;
pub mod settings;
pub mod sms;

use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{db::ImportSummary, error::ApiError, types::ImportMode};

// ============ Shared Request Types ============

/// `?id=` 쿼리 (id 를 본문 대신 쿼리로 받는 PUT/DELETE)
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

impl IdQuery {
    pub fn require(self) -> Result<String, ApiError> {
        self.id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::BadRequest("id is required".to_string()))
    }
}

/// `?mode=append|replace|upsert`
#[derive(Debug, Default, Deserialize)]
pub struct ModeQuery {
    pub mode: Option<String>,
}

impl ModeQuery {
    pub fn mode(&self) -> Option<ImportMode> {
        self.mode.as_deref().and_then(parse_mode)
    }
}

/// 모르는 값은 `None`
pub fn parse_mode(raw: &str) -> Option<ImportMode> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_lowercase())).ok()
}

#[derive(Debug, Deserialize)]
struct CsvBody {
    csv: Option<String>,
    mode: Option<String>,
}

/// CSV 업로드 본문
///
/// - `multipart/form-data`: `file` 필드 (선택적으로 `mode` 필드)
/// - 그 외: JSON `{ "csv": "...", "mode": "append" }`
#[derive(Debug)]
pub struct CsvUpload {
    pub text: String,
    pub mode: Option<ImportMode>,
}

#[axum::async_trait]
impl<S> FromRequest<S> for CsvUpload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Json(body) = Json::<CsvBody>::from_request(req, state)
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            let text = body
                .csv
                .filter(|csv| !csv.trim().is_empty())
                .ok_or_else(|| ApiError::BadRequest("no csv".to_string()))?;
            return Ok(Self {
                text,
                mode: body.mode.as_deref().and_then(parse_mode),
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        let mut text = None;
        let mut mode = None;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(e.body_text()))?;
            match name.as_str() {
                "file" => text = Some(value),
                "mode" => mode = parse_mode(&value),
                _ => {}
            }
        }

        let text = text.ok_or_else(|| ApiError::BadRequest("file field required".to_string()))?;
        Ok(Self { text, mode })
    }
}

/// CSV 가져오기 응답 `{ok, created, updated, count}`
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub summary: ImportSummary,
}

// ============ Helpers ============

/// CSV 다운로드 응답
pub fn csv_attachment(filename: &str, body: String) -> Response {
    (
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        body,
    )
        .into_response()
}
