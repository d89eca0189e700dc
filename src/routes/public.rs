//! Public Endpoints
//!
//! 공개 페이지가 쓰는 읽기 API와 상담 신청 폼 접수.
//! 후기/FAQ 공개 목록은 각각 `reviews`, `faqs` 모듈에 있다.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    db::{lenient, Area, PricingOption, Reservation, ReservationInput},
    error::ApiError,
    AppState,
};

/// 신청 폼
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub car_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub content: Option<String>,
    /// 개인정보 수집 동의. 정확히 `true` 여야 함
    #[serde(default)]
    pub agreed: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct ApplyResponse {
    pub ok: bool,
    pub item: Reservation,
}

#[derive(Debug, Serialize)]
pub struct Items<T> {
    pub ok: bool,
    pub items: Vec<T>,
}

fn invalid_payload() -> ApiError {
    ApiError::BadRequest("Invalid payload".to_string())
}

/// POST /api/public/apply
pub async fn apply(
    State(state): State<AppState>,
    body: Option<Json<ApplyRequest>>,
) -> Result<Json<ApplyResponse>, ApiError> {
    let Json(form) = body.ok_or_else(invalid_payload)?;

    let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
    if !filled(&form.name) || !filled(&form.phone) || form.agreed != serde_json::Value::Bool(true) {
        return Err(invalid_payload());
    }

    let item = state
        .db
        .create_reservation(ReservationInput {
            name: form.name,
            phone: form.phone,
            gender: form.gender,
            car_type: form.car_type,
            region: form.region,
            memo: form.content,
            ..Default::default()
        })
        .await?;

    Ok(Json(ApplyResponse { ok: true, item }))
}

/// GET /api/public/pricing
pub async fn pricing(State(state): State<AppState>) -> Result<Json<Items<PricingOption>>, ApiError> {
    Ok(Json(Items {
        ok: true,
        items: state.db.pricing().await?,
    }))
}

/// GET /api/public/areas
pub async fn areas(State(state): State<AppState>) -> Result<Json<Items<Area>>, ApiError> {
    Ok(Json(Items {
        ok: true,
        items: state.db.areas().await?,
    }))
}
