//! Error Handling Module
//!
//! Provides type-safe error handling with proper HTTP status code mapping.
//! Uses thiserror for domain errors and integrates with tracing for structured logging.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::db::StoreError;
use crate::services::{CsvError, SmsError};

/// 전화번호 입력 안내 문구
pub const PHONE_HINT: &str = "숫자 10~11자리(하이픈/공백 허용), +82도 입력 가능";

/// API 에러 타입
///
/// 각 에러 variant는 적절한 HTTP 상태 코드에 매핑됨
/// - 클라이언트 에러: 4xx (잘못된 요청, 인증 실패 등)
/// - 서버 에러: 5xx (내부 오류)
///
/// 민감한 내부 정보는 클라이언트에 노출하지 않음
#[derive(Debug, Error)]
pub enum ApiError {
    // ============ 400 Bad Request ============
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// 유효한 전화번호 없음
    #[error("No valid phone number")]
    InvalidPhone,

    /// 숫자가 아니거나 0 인 수신자 id
    #[error("Invalid id")]
    InvalidId,

    // ============ 401 Unauthorized ============
    #[error("Authentication required")]
    Unauthorized,

    // ============ 404 Not Found ============
    #[error("Resource not found: {0}")]
    NotFound(String),

    // ============ 500 Internal Server Error ============
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error")]
    InternalError,

    // ============ 502 Bad Gateway ============
    #[error("SMS send failed: {0}")]
    SmsSendFailed(String),

    // ============ 503 Service Unavailable ============
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// API 에러 응답 구조
#[derive(Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut hint = None;
        let (status, code, message, details) = match &self {
            // 4xx 클라이언트 에러
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                msg.clone(),
                None,
            ),
            ApiError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Validation failed".to_string(),
                Some(msg.clone()),
            ),
            ApiError::InvalidPhone => {
                hint = Some(PHONE_HINT.to_string());
                (
                    StatusCode::BAD_REQUEST,
                    "NO_VALID_PHONE",
                    "NO_VALID_PHONE".to_string(),
                    None,
                )
            }
            ApiError::InvalidId => (
                StatusCode::BAD_REQUEST,
                "INVALID_ID",
                "INVALID_ID".to_string(),
                None,
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized".to_string(),
                None,
            ),
            ApiError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{} not found", resource),
                None,
            ),

            // 5xx 서버 에러
            ApiError::Store(StoreError::Corrupt { file }) => {
                tracing::error!("Corrupt data file: {}", file);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_CORRUPT",
                    "Stored data could not be read".to_string(),
                    Some(file.clone()),
                )
            }
            ApiError::Store(_) => {
                // 내부 에러는 클라이언트에 상세 정보 노출 안 함
                tracing::error!("Store error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "Storage error occurred".to_string(),
                    None,
                )
            }
            ApiError::InternalError => {
                tracing::error!("Internal error: {:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::SmsSendFailed(detail) => {
                tracing::warn!("SMS send failed: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    "SEND_FAILED",
                    "SEND_FAILED".to_string(),
                    Some(detail.clone()),
                )
            }
            ApiError::ServiceUnavailable(service) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                format!("{} is currently unavailable", service),
                None,
            ),
        };

        let body = ErrorResponse {
            ok: false,
            error: message,
            code: code.to_string(),
            details,
            hint,
        };

        (status, Json(body)).into_response()
    }
}

/// CSV 파싱 에러는 잘못된 요청
impl From<CsvError> for ApiError {
    fn from(err: CsvError) -> Self {
        match err {
            CsvError::Output(detail) => {
                tracing::error!("CSV output failed: {}", detail);
                ApiError::InternalError
            }
            other => ApiError::ValidationError(other.to_string()),
        }
    }
}

/// SMS 업체 에러
impl From<SmsError> for ApiError {
    fn from(err: SmsError) -> Self {
        match err {
            SmsError::NotConfigured => ApiError::ServiceUnavailable("SMS".to_string()),
            SmsError::Transport(detail) => ApiError::SmsSendFailed(detail),
        }
    }
}

/// anyhow 에러를 ApiError로 변환
impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Anyhow error: {:?}", err);
        ApiError::InternalError
    }
}
