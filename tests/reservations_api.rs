//! Integration tests for reservation endpoints and the public apply form.

mod common;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use common::*;
use serde_json::json;

async fn create(app: &TestApp, body: serde_json::Value) -> serde_json::Value {
    let response = post_json(app.app(), "/api/reservations", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_applies_korean_aliases_and_default_status() {
    let app = TestApp::new().await;
    let item = create(
        &app,
        json!({ "이름": "김철수", "전화번호": "010-1234-5678", "차종": "오토", "지역": "서울", "문의내용": "주말" }),
    )
    .await;

    assert_eq!(item["name"], "김철수");
    assert_eq!(item["carType"], "오토");
    assert_eq!(item["region"], "서울");
    assert_eq!(item["memo"], "주말");
    assert_eq!(item["status"], "상담신청중");
    assert_eq!(item["id"].as_str().unwrap().len(), 36);

    // 파일에 저장됨
    let on_disk = std::fs::read_to_string(app.dir.path().join("reservations.json")).unwrap();
    assert!(on_disk.contains("김철수"));
    assert!(on_disk.ends_with('\n'));
}

#[tokio::test]
async fn create_requires_name_and_phone() {
    let app = TestApp::new().await;
    let response = post_json(app.app(), "/api/reservations", json!({ "name": "김철수" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["ok"], false);
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_requires_admin() {
    let app = TestApp::new().await;
    let response = get(app.app(), "/api/reservations").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Unauthorized");
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn list_accepts_header_and_cookie_tokens() {
    let app = TestApp::new().await;

    let by_header = Request::builder()
        .uri("/api/reservations")
        .header("x-admin-token", ADMIN)
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(app.app(), by_header).await.status(), StatusCode::OK);

    let by_cookie = Request::builder()
        .uri("/api/reservations")
        .header("cookie", format!("admin_token={ADMIN}"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(app.app(), by_cookie).await.status(), StatusCode::OK);

    let wrong = Request::builder()
        .uri("/api/reservations")
        .header(AUTHORIZATION, "Bearer nope")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(app.app(), wrong).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_paginates_and_filters() {
    let app = TestApp::new().await;
    for i in 0..20 {
        create(&app, json!({ "name": format!("사람{i}"), "phone": "01012345678", "region": if i % 2 == 0 { "서울" } else { "부산" } })).await;
    }

    let json = body_json(get_auth(app.app(), "/api/reservations?page=2&limit=15").await).await;
    assert_eq!(json["items"].as_array().unwrap().len(), 5);
    assert_eq!(json["pagination"]["page"], 2);
    assert_eq!(json["pagination"]["totalPages"], 2);
    assert_eq!(json["pagination"]["hasNext"], false);

    let json = body_json(get_auth(app.app(), "/api/reservations").await).await;
    assert_eq!(json["items"].as_array().unwrap().len(), 20);
    assert!(json["pagination"].is_null());

    let json = body_json(get_auth(app.app(), "/api/reservations?q=%EB%B6%80%EC%82%B0").await).await;
    assert_eq!(json["items"].as_array().unwrap().len(), 10);
}

// ---------------------------------------------------------------------------
// Update / status / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_merges_patch_and_keeps_id() {
    let app = TestApp::new().await;
    let item = create(&app, json!({ "name": "A", "phone": "010" })).await;
    let id = item["id"].as_str().unwrap();

    let response = put_json_auth(app.app(), &format!("/api/reservations/{id}"), json!({ "id": "hijack", "memo": "메모" })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["id"], id);
    assert_eq!(updated["memo"], "메모");
    assert_eq!(updated["name"], "A");
    assert!(updated["updatedAt"].is_string());

    let response = put_json_auth(app.app(), "/api/reservations", json!({ "id": id, "region": "대구" })).await;
    assert_eq!(body_json(response).await["region"], "대구");
}

#[tokio::test]
async fn update_unknown_or_missing_id() {
    let app = TestApp::new().await;
    let response = put_json_auth(app.app(), "/api/reservations/missing", json!({ "memo": "x" })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = put_json_auth(app.app(), "/api/reservations", json!({ "memo": "x" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_patch_requires_value() {
    let app = TestApp::new().await;
    let item = create(&app, json!({ "name": "A", "phone": "010" })).await;
    let uri = format!("/api/reservations/{}/status", item["id"].as_str().unwrap());

    let response = patch_json_auth(app.app(), &uri, json!({ "status": "  " })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json_auth(app.app(), &uri, json!({ "status": "상담확인" })).await;
    assert_eq!(body_json(response).await["status"], "상담확인");
}

#[tokio::test]
async fn delete_by_path_and_query() {
    let app = TestApp::new().await;
    let a = create(&app, json!({ "name": "A", "phone": "010" })).await;
    let b = create(&app, json!({ "name": "B", "phone": "010" })).await;

    let response = delete_auth(app.app(), &format!("/api/reservations/{}", a["id"].as_str().unwrap())).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app.app(), &format!("/api/reservations?id={}", b["id"].as_str().unwrap())).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete_auth(app.app(), "/api/reservations/gone").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[tokio::test]
async fn csv_export_has_bom_and_quoted_values() {
    let app = TestApp::new().await;
    create(&app, json!({ "name": "김\"철수\"", "phone": "010", "memo": "a,b" })).await;

    let response = get_auth(app.app(), "/api/reservations/csv").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CONTENT_TYPE], "text/csv; charset=utf-8");
    assert!(response.headers()[CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .contains("reservations.csv"));

    let text = body_text(response).await;
    let mut lines = text.lines();
    assert_eq!(lines.next().unwrap(), "\u{feff}id,name,gender,phone,carType,region,status,createdAt,memo");
    let row = lines.next().unwrap();
    assert!(row.contains("\"김\"\"철수\"\"\""));
    assert!(row.ends_with("\"a,b\""));
}

#[tokio::test]
async fn csv_import_json_body_upserts() {
    let app = TestApp::new().await;
    let existing = create(&app, json!({ "name": "기존", "phone": "010" })).await;
    let id = existing["id"].as_str().unwrap();

    let csv = format!("id,name,phone,status\n{id},기존,010,상담완료됨\n,신규,011,\n");
    let response = post_json_auth(app.app(), "/api/reservations/csv-import", json!({ "csv": csv })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json, json!({ "ok": true, "created": 1, "updated": 1, "count": 2 }));

    let list = body_json(get_auth(app.app(), "/api/reservations").await).await;
    assert_eq!(list["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn csv_import_multipart_replace() {
    let app = TestApp::new().await;
    create(&app, json!({ "name": "사라짐", "phone": "010" })).await;

    let boundary = "XTAYOBOUNDARY";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"mode\"\r\n\r\nreplace\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"r.csv\"\r\nContent-Type: text/csv\r\n\r\n\
         name,phone\r\n\"가, 나\",010\r\n다,011\r\n\r\n--{boundary}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/reservations/csv-import")
        .header(AUTHORIZATION, format!("Bearer {ADMIN}"))
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();

    let response = send(app.app(), request).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["created"], 2);

    let list = body_json(get_auth(app.app(), "/api/reservations").await).await;
    let names: Vec<&str> = list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["가, 나", "다"]);
}

#[tokio::test]
async fn csv_import_rejects_missing_csv_and_header() {
    let app = TestApp::new().await;

    let response = post_json_auth(app.app(), "/api/reservations/csv-import", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(app.app(), "/api/reservations/csv-import", json!({ "csv": ",,\n1,2" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Public apply form
// ---------------------------------------------------------------------------

#[tokio::test]
async fn apply_requires_agreement() {
    let app = TestApp::new().await;

    let response = post_json(app.app(), "/api/public/apply", json!({ "name": "A", "phone": "010", "agreed": "true" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["ok"], false);
    assert_eq!(json["error"], "Invalid payload");

    let response = post_json(
        app.app(),
        "/api/public/apply",
        json!({ "name": "A", "phone": "010", "carType": "오토", "content": "문의", "agreed": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["item"]["memo"], "문의");
    assert_eq!(json["item"]["carType"], "오토");
}

#[tokio::test]
async fn apply_rejects_non_json_body() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/public/apply")
        .header(CONTENT_TYPE, "text/plain")
        .body(Body::from("hello"))
        .unwrap();
    let response = send(app.app(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Invalid payload");
}
