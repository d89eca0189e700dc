//! Health Check Endpoint
//!
//! 로드밸런서/모니터링용. 저장소가 memory-only 로 떨어졌으면 `degraded`.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{db::StoreHealth, AppState};

/// Health check 응답
#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub status: String,
    pub version: String,
    pub timestamp: String,
    #[serde(flatten)]
    pub store: StoreHealth,
}

/// GET /health, GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.db.health().await;

    Json(HealthResponse {
        ok: true,
        status: if store.mem_only { "degraded" } else { "healthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        store,
    })
}
