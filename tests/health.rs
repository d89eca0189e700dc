//! Integration tests for health checks, CORS and store failure surfaces.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::*;
use serde_json::json;
use tayo_drive_api::config::{Config, Environment};

// ---------------------------------------------------------------------------
// Test: health endpoints report the data directory
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_reports_store_state() {
    let app = TestApp::new().await;

    for uri in ["/health", "/api/health"] {
        let response = get(app.app(), uri).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["memOnly"], false);
        assert_eq!(json["dir"], app.dir.path().display().to_string());
        assert!(json["cols"].is_array());
        assert!(json["version"].is_string());
    }
}

#[tokio::test]
async fn health_lists_loaded_collections() {
    let app = TestApp::new().await;
    get(app.app(), "/api/reviews").await;
    get(app.app(), "/api/faqs").await;

    let json = body_json(get(app.app(), "/health").await).await;
    assert_eq!(json["cols"], json!(["faqs", "reviews"]));
}

// ---------------------------------------------------------------------------
// Test: corrupt data files surface as errors and are left untouched
// ---------------------------------------------------------------------------

#[tokio::test]
async fn corrupt_file_is_reported_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reviews.json");
    std::fs::write(&path, "this is not json").unwrap();
    let app = TestApp::with_dir(dir).await;

    let response = get(app.app(), "/api/reviews").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["ok"], false);
    assert_eq!(json["code"], "STORE_CORRUPT");
    assert_eq!(json["details"], "reviews.json");

    let response = post_json_auth(app.app(), "/api/reviews", json!({ "title": "t", "author": "a" })).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "this is not json");
}

#[tokio::test]
async fn write_failure_mid_run_degrades_but_keeps_serving() {
    let app = TestApp::new().await;
    let response = post_json_auth(app.app(), "/api/reviews", json!({ "title": "first", "author": "a" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // 데이터 디렉터리를 파일로 바꿔 이후 기록을 실패시킨다
    let data_dir = app.dir.path().to_path_buf();
    std::fs::remove_dir_all(&data_dir).unwrap();
    std::fs::write(&data_dir, "not a dir").unwrap();

    let response = post_json_auth(app.app(), "/api/reviews", json!({ "title": "second", "author": "b" })).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let list = body_json(get(app.app(), "/api/reviews").await).await;
    let titles: Vec<&str> = list.as_array().unwrap().iter().map(|r| r["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["second", "first"]);

    let json = body_json(get(app.app(), "/health").await).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["memOnly"], true);

    std::fs::remove_file(&data_dir).unwrap();
}

#[tokio::test]
async fn concatenated_objects_are_recovered() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("faqs.json"),
        r#"{"id":"1","q":"첫 질문","a":"답"}{"id":"2","question":"둘째","answer":"답2"}"#,
    )
    .unwrap();
    let app = TestApp::with_dir(dir).await;

    let json = body_json(get(app.app(), "/api/faqs").await).await;
    let items = json.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[1]["q"], "둘째");
    assert_eq!(items[1]["icon"], "❓");
}

// ---------------------------------------------------------------------------
// Test: CORS in development allows the local frontends
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_allows_dev_origin() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/reviews")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())
        .unwrap();

    let response = send(app.app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn cors_preflight_in_production_allows_admin_token_header() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::for_data_dir(dir.path());
    config.environment = Environment::Production;
    config.allowed_origins = vec!["https://tayodrive.co.kr".to_string()];
    let app = TestApp::with_config(dir, config).await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/reservations")
        .header("origin", "https://tayodrive.co.kr")
        .header("access-control-request-method", "GET")
        .header("access-control-request-headers", "x-admin-token")
        .body(Body::empty())
        .unwrap();

    let response = send(app.app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-origin"], "https://tayodrive.co.kr");
    let allowed = response.headers()["access-control-allow-headers"].to_str().unwrap().to_string();
    assert!(allowed.contains("x-admin-token"), "{allowed}");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = TestApp::new().await;
    let response = get(app.app(), "/api/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
