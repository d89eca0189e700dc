//! Reservation Endpoints
//!
//! 상담 신청 접수(공개)와 관리자용 조회/수정/삭제, CSV 내보내기/가져오기.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};

use super::{csv_attachment, CsvUpload, IdQuery, ImportResponse, ModeQuery};
use crate::{
    auth::AdminAuth,
    db::{Fields, Reservation, ReservationFilter, ReservationInput},
    error::ApiError,
    services::csv,
    types::Pagination,
    AppState,
};

/// CSV 컬럼 순서
pub const CSV_COLUMNS: [&str; 9] = [
    "id", "name", "gender", "phone", "carType", "region", "status", "createdAt", "memo",
];

// ============ Request/Response Types ============

/// 목록 쿼리 파라미터
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 페이지 (1부터 시작). 없으면 전체 반환
    pub page: Option<u32>,
    /// 페이지 크기 (기본 15, 최대 100)
    pub limit: Option<u32>,
    pub status: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub items: Vec<Reservation>,
    /// `page` 를 주지 않으면 null
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: Option<String>,
}

// ============ Handlers ============

/// POST /api/reservations
///
/// 상담 신청 접수. 이름과 연락처 필수, 한글 키 별칭 허용
///
/// ```json
/// { "이름": "김철수", "전화번호": "010-1234-5678", "차종": "오토", "지역": "서울" }
/// ```
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(body): Json<Fields>,
) -> Result<(StatusCode, Json<Reservation>), ApiError> {
    let input = ReservationInput::from_fields(&body);
    if !input.has_contact() {
        return Err(ApiError::BadRequest("name and phone are required".to_string()));
    }

    let created = state.db.create_reservation(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/reservations?page=&limit=&status=&q=
pub async fn list_reservations(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, ApiError> {
    let filter = ReservationFilter {
        status: query.status,
        q: query.q,
    };
    let items = state.db.list_reservations(&filter).await?;

    let Some(page) = query.page else {
        return Ok(Json(ListResponse {
            items,
            pagination: None,
        }));
    };

    let pagination = Pagination::new(
        page,
        query.limit.unwrap_or(Pagination::DEFAULT_LIMIT),
        items.len(),
    );
    let items = items
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.limit as usize)
        .collect();

    Ok(Json(ListResponse {
        items,
        pagination: Some(pagination),
    }))
}

/// PUT /api/reservations  (본문에 id)
pub async fn update_reservation_by_body(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(body): Json<Fields>,
) -> Result<Json<Reservation>, ApiError> {
    let input = ReservationInput::from_fields(&body);
    let id = input
        .id
        .clone()
        .ok_or_else(|| ApiError::BadRequest("id is required".to_string()))?;
    update(&state, &id, input).await
}

/// PUT /api/reservations/:id
pub async fn update_reservation(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Fields>,
) -> Result<Json<Reservation>, ApiError> {
    update(&state, &id, ReservationInput::from_fields(&body)).await
}

async fn update(state: &AppState, id: &str, input: ReservationInput) -> Result<Json<Reservation>, ApiError> {
    state
        .db
        .update_reservation(id, input)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Reservation".to_string()))
}

/// PATCH /api/reservations/:id/status
pub async fn update_status(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Reservation>, ApiError> {
    let status = body
        .status
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("status is required".to_string()))?;

    state
        .db
        .set_reservation_status(&id, status)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Reservation".to_string()))
}

/// DELETE /api/reservations/:id
pub async fn delete_reservation(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    delete(&state, &id).await
}

/// DELETE /api/reservations?id=
pub async fn delete_reservation_by_query(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode, ApiError> {
    delete(&state, &query.require()?).await
}

async fn delete(state: &AppState, id: &str) -> Result<StatusCode, ApiError> {
    if state.db.delete_reservation(id).await? {
        tracing::info!(%id, "reservation deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Reservation".to_string()))
    }
}

/// GET /api/reservations/csv
pub async fn export_csv(_admin: AdminAuth, State(state): State<AppState>) -> Result<Response, ApiError> {
    let rows = state.db.list_reservations(&ReservationFilter::default()).await?;

    let body = csv::encode(
        &CSV_COLUMNS,
        rows.into_iter().map(|r| {
            vec![
                r.id, r.name, r.gender, r.phone, r.car_type, r.region, r.status, r.created_at, r.memo,
            ]
        }),
    )?;
    Ok(csv_attachment("reservations.csv", body))
}

/// POST /api/reservations/csv-import
///
/// multipart `file` 또는 JSON `{csv, mode}`. 기본 모드는 upsert (id 일치 시 병합)
pub async fn import_csv(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<ModeQuery>,
    upload: CsvUpload,
) -> Result<Json<ImportResponse>, ApiError> {
    let rows = csv::parse(&upload.text)?;
    let mode = upload.mode.or(query.mode()).unwrap_or_default();

    let summary = state.db.import_reservations(rows, mode).await?;
    Ok(Json(ImportResponse { ok: true, summary }))
}
