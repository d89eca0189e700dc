//! Admin authentication extractor.
//!
//! 관리자 요청은 아래 중 하나로 설정된 관리자 토큰을 보내면 통과한다.
//!
//! - `Authorization: Bearer <token>`
//! - `x-admin-token: <token>`
//! - 쿠키 `admin_token=<token>` (로그인 시 발급)
//!
//! ```ignore
//! async fn handler(_admin: AdminAuth, State(state): State<AppState>) -> Result<Json<..>, ApiError> { .. }
//! ```

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;

use crate::error::ApiError;
use crate::AppState;

/// 관리자 쿠키 이름
pub const ADMIN_COOKIE: &str = "admin_token";

/// 관리자 토큰 헤더
pub const ADMIN_HEADER: &str = "x-admin-token";

/// 쿠키 유효 시간 (8시간)
pub const SESSION_MAX_AGE_SECS: u64 = 8 * 60 * 60;

/// 관리자 인증을 통과한 요청
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let expected = state.config.admin_token.as_str();

        if presented_tokens(&parts.headers).iter().any(|t| t == expected) {
            Ok(AdminAuth)
        } else {
            tracing::debug!(path = %parts.uri.path(), "admin token missing or wrong");
            Err(ApiError::Unauthorized)
        }
    }
}

/// 요청에 실려 온 토큰 후보들 (Bearer, 헤더, 쿠키 순)
fn presented_tokens(headers: &HeaderMap) -> Vec<String> {
    let mut tokens = Vec::new();

    if let Some(bearer) = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
    {
        tokens.push(bearer.trim().to_string());
    }

    if let Some(header) = headers.get(ADMIN_HEADER).and_then(|v| v.to_str().ok()) {
        tokens.push(header.trim().to_string());
    }

    if let Some(cookie) = CookieJar::from_headers(headers).get(ADMIN_COOKIE) {
        tokens.push(cookie.value().to_string());
    }

    tokens.retain(|t| !t.is_empty());
    tokens
}

/// 로그인 성공 시 `Set-Cookie` 값
pub fn session_cookie(token: &str) -> String {
    format!("{ADMIN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_MAX_AGE_SECS}")
}

/// 로그아웃 시 쿠키 제거
pub fn cleared_cookie() -> String {
    format!("{ADMIN_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_tokens_from_every_source() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer a"));
        headers.insert(ADMIN_HEADER, HeaderValue::from_static("b"));
        headers.insert("cookie", HeaderValue::from_static("theme=dark; admin_token=c"));

        assert_eq!(presented_tokens(&headers), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_tokens() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        headers.insert(ADMIN_HEADER, HeaderValue::from_static(""));
        assert!(presented_tokens(&headers).is_empty());
    }

    #[test]
    fn test_cookie_strings() {
        assert_eq!(
            session_cookie("tok"),
            "admin_token=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=28800"
        );
        assert!(cleared_cookie().contains("Max-Age=0"));
    }
}
