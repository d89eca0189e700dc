//! Review Endpoints
//!
//! 후기 목록(공개), 관리자 등록/수정/삭제, 일괄 등록, CSV 내보내기/가져오기.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use super::{csv_attachment, CsvUpload, IdQuery, ImportResponse, ModeQuery};
use crate::{
    auth::AdminAuth,
    db::{Fields, Review, ReviewInput},
    error::ApiError,
    services::csv,
    types::ImportMode,
    AppState,
};

/// CSV 컬럼 순서
pub const CSV_COLUMNS: [&str; 8] = [
    "id", "title", "author", "rating", "views", "createdAt", "content", "image",
];

#[derive(Debug, Serialize)]
pub struct PublicReviews {
    pub ok: bool,
    pub items: Vec<Review>,
}

// ============ Handlers ============

/// GET /api/reviews
pub async fn list_reviews(State(state): State<AppState>) -> Result<Json<Vec<Review>>, ApiError> {
    Ok(Json(state.db.list_reviews().await?))
}

/// GET /api/public/reviews
///
/// 최신순 최대 60개
pub async fn public_reviews(State(state): State<AppState>) -> Result<Json<PublicReviews>, ApiError> {
    Ok(Json(PublicReviews {
        ok: true,
        items: state.db.public_reviews().await?,
    }))
}

/// POST /api/reviews
///
/// - `?mode=append|replace` + `{ "rows": [...] }`: 일괄 등록, 전체 목록 반환
/// - 그 외: 단건 등록 (title, author 필수), 201
pub async fn create_review(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ModeQuery>,
    Json(body): Json<Fields>,
) -> Result<Response, ApiError> {
    if let Some(mode @ (ImportMode::Append | ImportMode::Replace)) = query.mode() {
        let rows = rows_of(&body)?;
        let list = state.db.bulk_reviews(rows, mode).await?;
        tracing::info!(?mode, total = list.len(), "reviews bulk saved");
        return Ok(Json(list).into_response());
    }

    let input = ReviewInput::from_fields(&body);
    if !input.has_title_and_author() {
        return Err(ApiError::BadRequest("title and author are required".to_string()));
    }

    let created = state.db.create_review(input).await?;
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// `rows` 배열의 객체들
fn rows_of(body: &Fields) -> Result<Vec<Fields>, ApiError> {
    match body.get("rows") {
        Some(Value::Array(rows)) => Ok(rows
            .iter()
            .filter_map(|row| row.as_object().cloned())
            .collect()),
        _ => Err(ApiError::BadRequest("rows must be an array".to_string())),
    }
}

/// PUT /api/reviews  (본문에 id)
pub async fn update_review_by_body(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(body): Json<Fields>,
) -> Result<Json<Review>, ApiError> {
    let input = ReviewInput::from_fields(&body);
    let id = input
        .id
        .clone()
        .ok_or_else(|| ApiError::BadRequest("id is required".to_string()))?;
    update(&state, &id, input).await
}

/// PUT /api/reviews/:id
pub async fn update_review(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Fields>,
) -> Result<Json<Review>, ApiError> {
    update(&state, &id, ReviewInput::from_fields(&body)).await
}

async fn update(state: &AppState, id: &str, input: ReviewInput) -> Result<Json<Review>, ApiError> {
    state
        .db
        .update_review(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Review".to_string()))
}

/// DELETE /api/reviews/:id
pub async fn delete_review(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete(&state, &id).await
}

/// DELETE /api/reviews?id=
pub async fn delete_review_by_query(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode, ApiError> {
    delete(&state, &query.require()?).await
}

async fn delete(state: &AppState, id: &str) -> Result<StatusCode, ApiError> {
    if state.db.delete_review(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Review".to_string()))
    }
}

/// GET /api/reviews/csv
pub async fn export_csv(_admin: AdminAuth, State(state): State<AppState>) -> Result<Response, ApiError> {
    let rows = state.db.list_reviews().await?;

    let body = csv::encode(
        &CSV_COLUMNS,
        rows.into_iter().map(|r| {
            vec![
                r.id,
                r.title,
                r.author,
                r.rating.to_string(),
                r.views.to_string(),
                r.created_at,
                r.content,
                r.image,
            ]
        }),
    )?;
    Ok(csv_attachment("reviews.csv", body))
}

/// POST /api/reviews/csv-import
pub async fn import_csv(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ModeQuery>,
    upload: CsvUpload,
) -> Result<Json<ImportResponse>, ApiError> {
    let rows = csv::parse(&upload.text)?;
    let mode = upload.mode.or(query.mode()).unwrap_or_default();

    let summary = state.db.import_reviews(rows, mode).await?;
    Ok(Json(ImportResponse { ok: true, summary }))
}
