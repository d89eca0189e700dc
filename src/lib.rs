//! Tayo Drive Back-office API Library
//!
//! # Overview
//!
//! 방문 운전연수 "타요 드라이브" 사이트의 JSON API.
//! 공개 페이지(신청 폼, 후기, FAQ, 가격표, 지역)와 관리자 화면
//! (상담 신청 관리, 후기/FAQ/설정 관리, 문자 발송)이 이 API를 사용한다.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                         API                              │
//! │                                                          │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐  ┌─────────┐    │
//! │  │ Routes  │  │Services │  │   DB    │  │  Types  │    │
//! │  └────┬────┘  └────┬────┘  └────┬────┘  └────┬────┘    │
//! │       │            │            │            │          │
//! │       └────────────┴────────────┴────────────┘          │
//! │                    │            │                        │
//! └────────────────────┼────────────┼────────────────────────┘
//!                      ▼            ▼
//!              ┌──────────────┐ ┌──────────────────┐
//!              │ SMS (Aligo)  │ │ <data_dir>/*.json │
//!              └──────────────┘ └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `config`: 환경 설정 관리
//! - `error`: 에러 타입 및 처리
//! - `auth`: 관리자 토큰 확인 (Bearer / x-admin-token / 쿠키)
//! - `routes`: HTTP 엔드포인트 핸들러
//! - `services`: CSV 코덱, SMS 발송
//! - `db`: JSON 파일 저장소와 도메인 모델
//! - `types`: 공통 타입 정의
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tayo_drive_api::{config::Config, create_router, AppState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let state = AppState::from_config(config).await;
//!     let app = create_router(state);
//!
//!     // ... 서버 시작
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, patch, post, put},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod services;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use db::Database;
pub use error::ApiError;
pub use services::{AligoClient, SmsGateway};

/// 애플리케이션 전역 상태
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub sms: Arc<dyn SmsGateway>,
    pub config: Arc<Config>,
}

impl AppState {
    /// 설정으로 저장소와 SMS 클라이언트 구성
    pub async fn from_config(config: Config) -> Self {
        let db = Database::open(config.data_dir.clone()).await;
        let sms = AligoClient::new(reqwest::Client::new(), config.sms.clone());

        Self {
            db: Arc::new(db),
            sms: Arc::new(sms),
            config: Arc::new(config),
        }
    }
}

/// 라우터 생성
///
/// # Route Structure
///
/// ```text
/// GET    /health, /api/health               - 서버/저장소 상태
/// POST   /api/auth/login, /api/auth/logout  - 관리자 쿠키 발급/제거
///
/// POST   /api/reservations                  - 상담 신청 (공개)
/// GET    /api/reservations                  - 목록 (관리자, 페이지/필터)
/// PUT    /api/reservations[/:id]            - 수정
/// PATCH  /api/reservations/:id/status       - 상태 변경
/// DELETE /api/reservations[/:id | ?id=]     - 삭제
/// GET    /api/reservations/csv              - CSV 내보내기
/// POST   /api/reservations/csv-import       - CSV 가져오기
///
/// GET    /api/reviews                       - 후기 목록 (공개)
/// POST   /api/reviews[?mode=append|replace] - 등록 / 일괄 등록
/// PUT    /api/reviews[/:id]                 - 수정
/// DELETE /api/reviews[/:id | ?id=]          - 삭제
/// GET    /api/reviews/csv                   - CSV 내보내기
/// POST   /api/reviews/csv-import            - CSV 가져오기
///
/// GET    /api/faqs                          - FAQ 목록 (공개)
/// *      /api/admin/faqs                    - FAQ 관리
/// GET    /api/settings, /api/settings-public
/// PUT    /api/settings
///
/// GET|POST|DELETE /api/recipients           - 문자 수신자
/// DELETE /api/recipients/:id
/// POST   /api/sms/send, GET /api/sms/remain - 문자 발송/잔여 건수
///
/// POST   /api/public/apply                  - 신청 폼
/// GET    /api/public/{reviews,faq,pricing,areas}
/// GET    /api/admin/stats                   - 대시보드 집계
/// ```
pub fn create_router(state: AppState) -> Router {
    // CORS 설정
    // 프로덕션에서는 ALLOWED_ORIGINS 도메인만 허용
    // 개발 환경에서는 localhost 허용
    let cors = if state.config.is_production() {
        let origins: Vec<HeaderValue> = state
            .config
            .allowed_origins
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE])
            .allow_headers([
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                HeaderName::from_static("x-admin-token"),
            ])
            .allow_credentials(true)
    } else {
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:5173"), // Vite dev server
                HeaderValue::from_static("http://localhost:3000"), // Next dev server
                HeaderValue::from_static("http://127.0.0.1:5173"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    use routes::{admin, faqs, health, public, recipients, reservations, reviews, settings, sms};

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/api/health", get(health::health_check))

        // Admin login
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout))

        // Reservations
        .route(
            "/api/reservations",
            post(reservations::create_reservation)
                .get(reservations::list_reservations)
                .put(reservations::update_reservation_by_body)
                .delete(reservations::delete_reservation_by_query),
        )
        .route("/api/reservations/csv", get(reservations::export_csv))
        .route("/api/reservations/csv-import", post(reservations::import_csv))
        .route(
            "/api/reservations/:id",
            put(reservations::update_reservation).delete(reservations::delete_reservation),
        )
        .route("/api/reservations/:id/status", patch(reservations::update_status))

        // Reviews
        .route(
            "/api/reviews",
            get(reviews::list_reviews)
                .post(reviews::create_review)
                .put(reviews::update_review_by_body)
                .delete(reviews::delete_review_by_query),
        )
        .route("/api/reviews/csv", get(reviews::export_csv))
        .route("/api/reviews/csv-import", post(reviews::import_csv))
        .route(
            "/api/reviews/:id",
            put(reviews::update_review).delete(reviews::delete_review),
        )

        // FAQs
        .route("/api/faqs", get(faqs::list_faqs))
        .route(
            "/api/admin/faqs",
            get(faqs::admin_list)
                .post(faqs::create_faq)
                .put(faqs::update_faq)
                .delete(faqs::delete_faq),
        )

        // Settings
        .route("/api/settings", get(settings::get_settings).put(settings::update_settings))
        .route("/api/settings-public", get(settings::public_settings))

        // Recipients & SMS
        .route(
            "/api/recipients",
            get(recipients::list_recipients)
                .post(recipients::add_recipients)
                .delete(recipients::delete_recipients),
        )
        .route("/api/recipients/:id", axum::routing::delete(recipients::delete_recipient))
        .route("/api/sms/send", post(sms::send_sms))
        .route("/api/sms/remain", get(sms::remain))

        // Public
        .route("/api/public/apply", post(public::apply))
        .route("/api/public/reviews", get(reviews::public_reviews))
        .route("/api/public/faq", get(faqs::public_faqs))
        .route("/api/public/pricing", get(public::pricing))
        .route("/api/public/areas", get(public::areas))

        // Admin dashboard
        .route("/api/admin/stats", get(admin::stats))

        // 미들웨어
        .layer(TraceLayer::new_for_http())
        .layer(cors)

        // 상태 주입
        .with_state(state)
}
