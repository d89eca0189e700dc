//! Admin Login Endpoints
//!
//! 비밀번호가 맞으면 관리자 토큰을 `admin_token` 쿠키로 발급한다.

use axum::{
    extract::State,
    http::{header::SET_COOKIE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    auth::{cleared_cookie, session_cookie},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

/// POST /api/auth/login
pub async fn login(State(state): State<AppState>, body: Option<Json<LoginRequest>>) -> Response {
    let password = body.and_then(|Json(b)| b.password).unwrap_or_default();

    if password.is_empty() || password != state.config.admin_password {
        tracing::warn!("admin login rejected");
        return (StatusCode::UNAUTHORIZED, Json(json!({ "ok": false }))).into_response();
    }

    tracing::info!("admin logged in");
    (
        [(SET_COOKIE, session_cookie(&state.config.admin_token))],
        Json(json!({ "ok": true })),
    )
        .into_response()
}

/// POST /api/auth/logout
pub async fn logout() -> Response {
    ([(SET_COOKIE, cleared_cookie())], Json(json!({ "ok": true }))).into_response()
}
