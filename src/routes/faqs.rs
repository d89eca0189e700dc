//! FAQ Endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::IdQuery;
use crate::{
    auth::AdminAuth,
    db::{Faq, FaqInput},
    error::ApiError,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct PublicFaqs {
    pub ok: bool,
    pub items: Vec<Faq>,
}

/// GET /api/faqs
pub async fn list_faqs(State(state): State<AppState>) -> Result<Json<Vec<Faq>>, ApiError> {
    Ok(Json(state.db.list_faqs().await?))
}

/// GET /api/public/faq
pub async fn public_faqs(State(state): State<AppState>) -> Result<Json<PublicFaqs>, ApiError> {
    Ok(Json(PublicFaqs {
        ok: true,
        items: state.db.list_faqs().await?,
    }))
}

/// GET /api/admin/faqs
pub async fn admin_list(_admin: AdminAuth, State(state): State<AppState>) -> Result<Json<Vec<Faq>>, ApiError> {
    Ok(Json(state.db.list_faqs().await?))
}

/// POST /api/admin/faqs
///
/// `{icon?, q, a}` → 맨 앞에 추가
pub async fn create_faq(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(body): Json<FaqInput>,
) -> Result<(StatusCode, Json<Faq>), ApiError> {
    let required = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let (Some(q), Some(a)) = (required(body.q), required(body.a)) else {
        return Err(ApiError::BadRequest("q and a are required".to_string()));
    };

    let faq = state.db.create_faq(body.icon, q, a).await?;
    Ok((StatusCode::CREATED, Json(faq)))
}

/// PUT /api/admin/faqs
///
/// `{id, icon?, q?, a?}` 온 필드만 수정
pub async fn update_faq(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(mut body): Json<FaqInput>,
) -> Result<Json<Faq>, ApiError> {
    let id = IdQuery { id: body.id.take() }.require()?;

    state
        .db
        .update_faq(&id, body)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("FAQ".to_string()))
}

/// DELETE /api/admin/faqs?id=
pub async fn delete_faq(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<StatusCode, ApiError> {
    let id = query.require()?;
    if state.db.delete_faq(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("FAQ".to_string()))
    }
}
