//! Settings Endpoints
//!
//! 사이트 설정 (카카오 채널 URL, 메타 태그).

use axum::{extract::State, Json};

use crate::{
    auth::AdminAuth,
    db::{Settings, SettingsPatch},
    error::ApiError,
    AppState,
};

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<Settings>, ApiError> {
    Ok(Json(state.db.settings().await?))
}

/// GET /api/settings-public
///
/// 공개 가능한 세 항목. 저장된 값이 null 이면 빈 문자열로 읽힌다
pub async fn public_settings(State(state): State<AppState>) -> Result<Json<Settings>, ApiError> {
    Ok(Json(state.db.settings().await?))
}

/// PUT /api/settings
///
/// - `kakaoChannelUrl`: 빈 값이 아닐 때만 교체
/// - `metaTitle`, `metaDescription`: 값이 오면 (빈 값이라도) 교체
pub async fn update_settings(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<Settings>, ApiError> {
    let settings = state.db.update_settings(patch).await?;
    tracing::info!("settings updated");
    Ok(Json(settings))
}
