//! Services Module
//!
//! 저장소 밖의 기능을 담당하는 서비스 레이어
//!
//! # Services
//! - `csv`: CSV 내보내기/가져오기 (`csv` 크레이트)
//! - `SmsGateway`: 문자 발송 업체 연동 (Aligo)

pub mod csv;
mod sms;

pub use self::csv::CsvError;
pub use sms::{parse_vendor_reply, AligoClient, MessageType, OutgoingSms, SmsError, SmsGateway};

#[cfg(test)]
pub use sms::mock;
