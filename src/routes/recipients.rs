//! Recipient Endpoints
//!
//! 문자 수신자 관리. 번호는 숫자만 남기고 `82` 국가번호는 `0` 으로 바꿔 저장한다.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    auth::AdminAuth,
    db::{lenient, Recipient},
    error::ApiError,
    types::PhoneNumber,
    AppState,
};

// ============ Request/Response Types ============

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// 단건 `{phone, label?}` 또는 일괄 `{numbers}`
#[derive(Debug, Deserialize)]
pub struct AddRequest {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub numbers: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteManyRequest {
    #[serde(default)]
    pub ids: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct RecipientsResponse {
    pub ok: bool,
    pub data: Vec<Recipient>,
}

#[derive(Debug, Serialize)]
pub struct RecipientResponse {
    pub ok: bool,
    pub data: Recipient,
}

#[derive(Debug, Serialize)]
pub struct BulkAddResponse {
    pub ok: bool,
    /// 새로 추가된 번호 수 (이미 있던 번호 제외)
    pub added: usize,
    /// 입력에서 찾은 유효한 번호 수
    pub valid: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub ok: bool,
    pub deleted: usize,
}

// ============ Handlers ============

/// GET /api/recipients?search=
pub async fn list_recipients(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<RecipientsResponse>, ApiError> {
    Ok(Json(RecipientsResponse {
        ok: true,
        data: state.db.list_recipients(query.search.as_deref()).await?,
    }))
}

/// POST /api/recipients
pub async fn add_recipients(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(body): Json<AddRequest>,
) -> Result<Response, ApiError> {
    if let Some(numbers) = body.numbers.as_deref() {
        let phones = PhoneNumber::parse_many(numbers);
        if phones.is_empty() {
            return Err(ApiError::InvalidPhone);
        }
        let valid = phones.len();
        let added = state.db.add_recipients(phones).await?;
        tracing::info!(valid, added, "recipients bulk added");
        return Ok(Json(BulkAddResponse { ok: true, added, valid }).into_response());
    }

    let phone = body
        .phone
        .as_deref()
        .and_then(PhoneNumber::parse)
        .ok_or(ApiError::InvalidPhone)?;
    let label = body.label.filter(|l| !l.trim().is_empty());

    let saved = state.db.upsert_recipient(phone, label).await?;
    Ok(Json(RecipientResponse { ok: true, data: saved }).into_response())
}

/// DELETE /api/recipients/:id
pub async fn delete_recipient(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_id(&id).ok_or(ApiError::InvalidId)?;

    if state.db.delete_recipient(id).await? {
        Ok(Json(DeleteResponse { ok: true, deleted: 1 }))
    } else {
        Err(ApiError::NotFound("Recipient".to_string()))
    }
}

/// DELETE /api/recipients  `{ids: [...]}`
///
/// `ids` 가 없거나 비어 있으면 전체 삭제. 목록이 왔는데 유효한 id 가 하나도 없으면 400
pub async fn delete_recipients(
    _admin: AdminAuth,
    State(state): State<AppState>,
    body: Option<Json<DeleteManyRequest>>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let raw = body.map(|Json(b)| b.ids).unwrap_or_default();
    let ids: Vec<i64> = raw
        .iter()
        .filter_map(|v| parse_id(&lenient::value_to_string(v)))
        .collect();
    if ids.is_empty() && !raw.is_empty() {
        return Err(ApiError::InvalidId);
    }

    let deleted = state.db.delete_recipients(&ids).await?;
    tracing::info!(deleted, all = ids.is_empty(), "recipients deleted");
    Ok(Json(DeleteResponse { ok: true, deleted }))
}

/// 0 이 아닌 정수만
fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id != 0)
}
