//! Integration tests for admin login and token checks.

mod common;

use axum::body::Body;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use common::*;
use serde_json::json;
use tayo_drive_api::config::DEV_ADMIN_PASSWORD;

// ---------------------------------------------------------------------------
// Test: login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let app = TestApp::new().await;

    let response = post_json(app.app(), "/api/auth/login", json!({ "password": "wrong" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(SET_COOKIE).is_none());
    assert_eq!(body_json(response).await, json!({ "ok": false }));

    let response = post_json(app.app(), "/api/auth/login", json!({})).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_sets_cookie_that_unlocks_admin_routes() {
    let app = TestApp::new().await;

    let response = post_json(app.app(), "/api/auth/login", json!({ "password": DEV_ADMIN_PASSWORD })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response.headers()[SET_COOKIE].to_str().unwrap().to_string();
    assert!(cookie.starts_with(&format!("admin_token={ADMIN}")));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=28800"));
    assert_eq!(body_json(response).await, json!({ "ok": true }));

    let pair = cookie.split(';').next().unwrap().to_string();
    let request = Request::builder()
        .uri("/api/admin/stats")
        .header(COOKIE, pair)
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(app.app(), request).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_clears_cookie() {
    let app = TestApp::new().await;
    let response = post_json(app.app(), "/api/auth/logout", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
    assert!(cookie.starts_with("admin_token=;"));
    assert!(cookie.contains("Max-Age=0"));
}

// ---------------------------------------------------------------------------
// Test: admin-only routes refuse anonymous callers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_routes_require_token() {
    let app = TestApp::new().await;

    for uri in [
        "/api/admin/stats",
        "/api/admin/faqs",
        "/api/recipients",
        "/api/sms/remain",
        "/api/reservations/csv",
        "/api/reviews/csv",
    ] {
        let response = get(app.app(), uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let response = post_json(app.app(), "/api/sms/send", json!({ "to": "01012345678", "msg": "hi" })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.sms.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn stats_counts_collections() {
    let app = TestApp::new().await;
    post_json(app.app(), "/api/reservations", json!({ "name": "A", "phone": "010" })).await;
    post_json(app.app(), "/api/reservations", json!({ "name": "B", "phone": "010", "status": "상담완료됨" })).await;
    post_json_auth(app.app(), "/api/reviews", json!({ "title": "t", "author": "a" })).await;

    let response = get_auth(app.app(), "/api/admin/stats").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["reservations"]["total"], 2);
    assert_eq!(json["reservations"]["byStatus"]["상담신청중"], 1);
    assert_eq!(json["reservations"]["byStatus"]["상담완료됨"], 1);
    assert_eq!(json["reservations"]["byStatus"]["상담취소"], 0);
    assert_eq!(json["reviews"], 1);
    assert_eq!(json["faqs"], 0);
    assert_eq!(json["recipients"], 0);
}
