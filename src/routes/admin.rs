//! Admin Dashboard Endpoints

use axum::{extract::State, Json};

use crate::{auth::AdminAuth, db::Stats, error::ApiError, AppState};

/// GET /api/admin/stats
///
/// ```json
/// {
///   "reservations": { "total": 12, "byStatus": { "상담신청중": 5, "상담확인": 4, ... } },
///   "reviews": 30, "faqs": 8, "recipients": 41
/// }
/// ```
pub async fn stats(_admin: AdminAuth, State(state): State<AppState>) -> Result<Json<Stats>, ApiError> {
    Ok(Json(state.db.stats().await?))
}
