//! 느슨한 역직렬화 헬퍼
//!
//! 기존 JSON 파일에는 숫자 id (`Date.now()`), `null` 필드, 숫자 문자열 평점 등이
//! 섞여 있으므로 모델 필드는 이 헬퍼를 거쳐 읽는다.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// JSON 값을 문자열로 (null → "", 숫자/불리언 → 문자열)
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(&Value::deserialize(deserializer)?))
}

/// null 이면 `None`
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        other => Some(value_to_string(&other)),
    })
}

/// 정수 id (숫자 또는 숫자 문자열)
pub fn parse_int_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn int_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_int_id(&value).ok_or_else(|| serde::de::Error::custom(format!("not an integer id: {value}")))
}

/// 1~5 평점. 범위 밖이거나 숫자가 아니면 5
pub fn rating<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_rating(&Value::deserialize(deserializer)?))
}

pub fn parse_rating(value: &Value) -> u8 {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match n {
        Some(n) if (1.0..=5.0).contains(&n) => n.round() as u8,
        _ => 5,
    }
}

/// 음수가 아닌 정수. 그 외 0
pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_count(&Value::deserialize(deserializer)?))
}

pub fn parse_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .unwrap_or(0)
}
