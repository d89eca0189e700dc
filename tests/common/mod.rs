#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use tayo_drive_api::config::{Config, DEV_ADMIN_TOKEN};
use tayo_drive_api::services::{OutgoingSms, SmsError, SmsGateway};
use tayo_drive_api::{create_router, AppState, Database};

/// Admin token accepted by the test app.
pub const ADMIN: &str = DEV_ADMIN_TOKEN;

/// SMS gateway that records requests instead of calling the vendor.
#[derive(Default)]
pub struct FakeSms {
    pub sent: Mutex<Vec<OutgoingSms>>,
    /// When set, every call fails with this transport error.
    pub fail_with: Mutex<Option<String>>,
}

#[async_trait]
impl SmsGateway for FakeSms {
    async fn send(&self, sms: &OutgoingSms) -> Result<Value, SmsError> {
        if let Some(err) = self.fail_with.lock().unwrap().clone() {
            return Err(SmsError::Transport(err));
        }
        self.sent.lock().unwrap().push(sms.clone());
        Ok(json!({ "result_code": "1", "message": "success", "msg_id": "123" }))
    }

    async fn remain(&self) -> Result<Value, SmsError> {
        Ok(json!({ "result_code": 1, "SMS_CNT": 512, "LMS_CNT": 200 }))
    }
}

/// A router over a fresh temporary data directory.
pub struct TestApp {
    pub dir: TempDir,
    pub router: Router,
    pub sms: Arc<FakeSms>,
    pub db: Arc<Database>,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        Self::with_dir(dir).await
    }

    /// Build over an existing directory (files may be seeded beforehand).
    pub async fn with_dir(dir: TempDir) -> Self {
        let config = Config::for_data_dir(dir.path());
        Self::with_config(dir, config).await
    }

    /// Build with a custom config (e.g. production CORS).
    pub async fn with_config(dir: TempDir, config: Config) -> Self {
        let db = Arc::new(Database::open(dir.path()).await);
        let sms = Arc::new(FakeSms::default());

        let state = AppState {
            db: db.clone(),
            sms: sms.clone(),
            config: Arc::new(config),
        };

        Self {
            dir,
            router: create_router(state),
            sms,
            db,
        }
    }

    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {ADMIN}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn json_request(app: Router, method: Method, uri: &str, body: Value, token: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body, None).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value) -> Response<Body> {
    json_request(app, Method::POST, uri, body, Some(ADMIN)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value) -> Response<Body> {
    json_request(app, Method::PUT, uri, body, Some(ADMIN)).await
}

pub async fn patch_json_auth(app: Router, uri: &str, body: Value) -> Response<Body> {
    json_request(app, Method::PATCH, uri, body, Some(ADMIN)).await
}

pub async fn delete_auth(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {ADMIN}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
