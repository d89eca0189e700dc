//! SMS Endpoints
//!
//! 관리자 문자 발송과 잔여 건수 조회. 업체 응답은 `data` 로 그대로 전달한다.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    auth::AdminAuth,
    db::lenient,
    error::ApiError,
    services::{MessageType, OutgoingSms},
    AppState,
};

/// 발송 요청
///
/// ```json
/// { "to": "010-1234-5678,010-9999-0000", "msg": "안녕하세요", "msg_type": "AUTO" }
/// ```
#[derive(Debug, Deserialize)]
pub struct SendRequest {
    /// 수신자들 (콤마로 여러 개)
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub msg: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub msg_type: Option<String>,
    /// LMS/MMS 제목
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub testmode_yn: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VendorResponse {
    pub ok: bool,
    pub data: Value,
}

/// POST /api/sms/send
pub async fn send_sms(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(body): Json<SendRequest>,
) -> Result<Json<VendorResponse>, ApiError> {
    let msg = body.msg.unwrap_or_default();
    if msg.trim().is_empty() {
        return Err(ApiError::BadRequest("msg is required".to_string()));
    }

    let sms = OutgoingSms {
        receiver: OutgoingSms::clean_receiver(body.to.as_deref().unwrap_or_default()),
        msg,
        msg_type: body
            .msg_type
            .as_deref()
            .map(MessageType::parse)
            .unwrap_or_default(),
        title: body.title.filter(|t| !t.is_empty()),
        testmode_yn: body
            .testmode_yn
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| state.config.sms.default_testmode.clone()),
    };
    if !sms.has_receiver() {
        return Err(ApiError::BadRequest("receiver is required".to_string()));
    }

    tracing::info!(
        receivers = sms.receiver.split(',').filter(|n| !n.is_empty()).count(),
        msg_type = sms.msg_type.as_str(),
        testmode = %sms.testmode_yn,
        "sending SMS"
    );
    let data = state.sms.send(&sms).await?;
    Ok(Json(VendorResponse { ok: true, data }))
}

/// GET /api/sms/remain
pub async fn remain(_admin: AdminAuth, State(state): State<AppState>) -> Result<Json<VendorResponse>, ApiError> {
    let data = state.sms.remain().await?;
    Ok(Json(VendorResponse { ok: true, data }))
}
