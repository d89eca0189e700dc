//! SMS Service
//!
//! 문자 발송 업체(Aligo) HTTP API 연동.
//!
//! - `POST {base}/send/`   : `application/x-www-form-urlencoded`
//! - `POST {base}/remain/` : 잔여 건수 조회
//!
//! 업체 응답은 JSON 이 아닐 때도 있으므로 `{"raw": "..."}` 로 감싸 돌려준다.
//! 테스트에서는 네트워크 대신 `SmsGateway` 목(mock) 구현을 주입한다.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::config::SmsConfig;

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("SMS vendor credentials are not configured")]
    NotConfigured,

    #[error("SMS vendor request failed: {0}")]
    Transport(String),
}

/// 메시지 타입
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Sms,
    Lms,
    Mms,
    #[default]
    Auto,
}

impl MessageType {
    /// 대소문자 무시, 모르는 값은 `Auto`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SMS" => MessageType::Sms,
            "LMS" => MessageType::Lms,
            "MMS" => MessageType::Mms,
            _ => MessageType::Auto,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Sms => "SMS",
            MessageType::Lms => "LMS",
            MessageType::Mms => "MMS",
            MessageType::Auto => "AUTO",
        }
    }
}

/// 발송 요청 (이미 정리된 값)
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingSms {
    /// 숫자와 콤마만 남긴 수신번호 목록
    pub receiver: String,
    pub msg: String,
    pub msg_type: MessageType,
    /// LMS/MMS 제목
    pub title: Option<String>,
    /// "Y" | "N"
    pub testmode_yn: String,
}

impl OutgoingSms {
    /// 숫자와 콤마 외 문자 제거 (하이픈, 공백 등)
    pub fn clean_receiver(to: &str) -> String {
        to.chars().filter(|c| c.is_ascii_digit() || *c == ',').collect()
    }

    /// 수신번호가 하나 이상 있는지
    pub fn has_receiver(&self) -> bool {
        self.receiver.split(',').any(|n| !n.is_empty())
    }
}

#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, sms: &OutgoingSms) -> Result<Value, SmsError>;

    async fn remain(&self) -> Result<Value, SmsError>;
}

/// Aligo 구현
pub struct AligoClient {
    http: reqwest::Client,
    config: SmsConfig,
}

impl AligoClient {
    pub fn new(http: reqwest::Client, config: SmsConfig) -> Self {
        Self { http, config }
    }

    fn credentials(&self) -> Result<(&str, &str, &str), SmsError> {
        match (&self.config.api_key, &self.config.user_id, &self.config.sender) {
            (Some(key), Some(user_id), Some(sender)) => Ok((key, user_id, sender)),
            _ => Err(SmsError::NotConfigured),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Result<Value, SmsError> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "calling SMS vendor");

        let response = self
            .http
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;

        tracing::info!(%url, status = status.as_u16(), "SMS vendor replied");
        Ok(parse_vendor_reply(&text))
    }
}

#[async_trait]
impl SmsGateway for AligoClient {
    async fn send(&self, sms: &OutgoingSms) -> Result<Value, SmsError> {
        let (key, user_id, sender) = self.credentials()?;

        let mut form: Vec<(&str, &str)> = vec![
            ("key", key),
            ("user_id", user_id),
            ("sender", sender),
            ("receiver", &sms.receiver),
            ("msg", &sms.msg),
            ("msg_type", sms.msg_type.as_str()),
        ];
        if let Some(title) = sms.title.as_deref().filter(|t| !t.is_empty()) {
            form.push(("title", title));
        }
        form.push(("testmode_yn", &sms.testmode_yn));

        self.post_form("send", &form).await
    }

    async fn remain(&self) -> Result<Value, SmsError> {
        let (key, user_id, _) = self.credentials()?;
        self.post_form("remain", &[("user_id", user_id), ("key", key)]).await
    }
}

/// JSON 이면 그대로, 아니면 `{"raw": text}`
pub fn parse_vendor_reply(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}

#[cfg(test)]
pub mod mock {
    //! 네트워크 없이 발송 요청을 기록하는 게이트웨이

    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct RecordingGateway {
        pub sent: Mutex<Vec<OutgoingSms>>,
    }

    #[async_trait]
    impl SmsGateway for RecordingGateway {
        async fn send(&self, sms: &OutgoingSms) -> Result<Value, SmsError> {
            self.sent.lock().unwrap().push(sms.clone());
            Ok(json!({ "result_code": "1", "message": "success" }))
        }

        async fn remain(&self) -> Result<Value, SmsError> {
            Ok(json!({ "result_code": 1, "SMS_CNT": 100 }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock::RecordingGateway;

    #[test]
    fn test_clean_receiver() {
        assert_eq!(
            OutgoingSms::clean_receiver("010-1234-5678, 010 9999 0000"),
            "01012345678,01099990000"
        );
    }

    #[test]
    fn test_vendor_reply_json_or_raw() {
        assert_eq!(parse_vendor_reply(r#"{"result_code":"1"}"#)["result_code"], "1");
        assert_eq!(parse_vendor_reply("<html>oops</html>")["raw"], "<html>oops</html>");
    }

    #[test]
    fn test_message_type_default_is_auto() {
        let t: MessageType = serde_json::from_str("\"LMS\"").unwrap();
        assert_eq!(t, MessageType::Lms);
        assert_eq!(MessageType::parse("mms"), MessageType::Mms);
        assert_eq!(MessageType::parse("fax"), MessageType::Auto);
        assert_eq!(MessageType::default().as_str(), "AUTO");
    }

    #[tokio::test]
    async fn test_unconfigured_client_refuses() {
        let config = crate::config::Config::for_data_dir("/tmp").sms;
        let client = AligoClient::new(reqwest::Client::new(), config);
        let err = client.remain().await.unwrap_err();
        assert!(matches!(err, SmsError::NotConfigured));
    }

    #[tokio::test]
    async fn test_recording_gateway() {
        let gateway = RecordingGateway::default();
        let sms = OutgoingSms {
            receiver: "01012345678".into(),
            msg: "안녕하세요".into(),
            msg_type: MessageType::Sms,
            title: None,
            testmode_yn: "Y".into(),
        };
        let reply = tokio_test::assert_ok!(gateway.send(&sms).await);
        assert_eq!(reply["result_code"], "1");
        assert_eq!(gateway.sent.lock().unwrap().len(), 1);
    }
}
