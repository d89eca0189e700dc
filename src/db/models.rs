//! Data Models
//!
//! 파일에 저장되는 레코드와, 요청/CSV 에서 레코드를 만드는 입력 타입.
//! 와이어 포맷은 프론트엔드가 쓰던 camelCase 필드 이름을 그대로 따른다.

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::json_store::Record;
use super::lenient;
use crate::types::ReservationStatus;

/// 요청 본문이나 CSV 한 줄 (키 → 값)
pub type Fields = Map<String, Value>;

/// JS `toISOString()` 과 같은 형태 (밀리초, `Z`)
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// 여러 별칭 중 처음으로 값이 있는 키 (null 은 없는 것으로 취급)
fn pick(fields: &Fields, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| fields.get(*k))
        .find(|v| !v.is_null())
        .map(lenient::value_to_string)
}

fn pick_trimmed(fields: &Fields, keys: &[&str]) -> Option<String> {
    pick(fields, keys).map(|s| s.trim().to_string())
}

fn pick_value<'a>(fields: &'a Fields, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| fields.get(*k))
        .find(|v| !v.is_null())
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.trim().is_empty())
}

// ============ Reservation ============

/// 상담 신청
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub gender: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub car_type: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub region: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub memo: String,
    /// 자유 텍스트. 비어 있으면 "상담신청중" 으로 간주
    #[serde(default, deserialize_with = "lenient::string")]
    pub status: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Record for Reservation {
    const COLLECTION: &'static str = "reservations";

    fn id(&self) -> String {
        self.id.clone()
    }
}

impl Reservation {
    /// 신청 폼 / 관리자 추가 / CSV 한 줄에서 새 레코드 생성
    pub fn from_input(input: ReservationInput) -> Self {
        Self {
            id: new_id(),
            name: input.name.unwrap_or_default(),
            phone: input.phone.unwrap_or_default(),
            gender: input.gender.unwrap_or_default(),
            car_type: input.car_type.unwrap_or_default(),
            region: input.region.unwrap_or_default(),
            memo: input.memo.unwrap_or_default(),
            status: non_empty(input.status).unwrap_or_else(|| ReservationStatus::Requested.label().to_string()),
            created_at: non_empty(input.created_at).unwrap_or_else(now_iso),
            updated_at: None,
        }
    }

    /// 가져온 행 그대로 (행에 id 가 있으면 유지)
    pub fn from_row(input: ReservationInput) -> Self {
        let id = input.id.clone();
        let mut r = Self::from_input(input);
        if let Some(id) = id {
            r.id = id;
        }
        r
    }

    /// 입력에 있는 필드만 덮어쓰기 (id 는 바뀌지 않음)
    pub fn apply(&mut self, input: ReservationInput) {
        if let Some(v) = input.name {
            self.name = v;
        }
        if let Some(v) = input.phone {
            self.phone = v;
        }
        if let Some(v) = input.gender {
            self.gender = v;
        }
        if let Some(v) = input.car_type {
            self.car_type = v;
        }
        if let Some(v) = input.region {
            self.region = v;
        }
        if let Some(v) = input.memo {
            self.memo = v;
        }
        if let Some(v) = non_empty(input.status) {
            self.status = v;
        }
        if let Some(v) = non_empty(input.created_at) {
            self.created_at = v;
        }
        self.updated_at = Some(now_iso());
    }

    pub fn status(&self) -> ReservationStatus {
        ReservationStatus::from_label(&self.status)
    }
}

/// 상담 신청 입력 (한글/영문 키 별칭 허용)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationInput {
    pub id: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub car_type: Option<String>,
    pub region: Option<String>,
    pub memo: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
}

impl ReservationInput {
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            id: non_empty(pick_trimmed(fields, &["id"])),
            name: pick(fields, &["name", "이름"]),
            phone: pick(fields, &["phone", "전화", "전화번호"]),
            gender: pick(fields, &["gender", "성별"]),
            car_type: pick(fields, &["carType", "car", "차종", "vehicle", "vehicleType"]),
            region: pick(fields, &["region", "area", "지역", "city"]),
            memo: pick(fields, &["memo", "content", "문의내용", "note"]),
            status: pick(fields, &["status"]),
            created_at: pick(fields, &["createdAt"]),
        }
    }

    /// 이름과 연락처는 필수
    pub fn has_contact(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.name) && filled(&self.phone)
    }
}

// ============ Review ============

fn default_rating() -> u8 {
    5
}

/// 수강 후기
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub author: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub email: String,
    #[serde(default, alias = "body", deserialize_with = "lenient::string")]
    pub content: String,
    #[serde(default = "default_rating", deserialize_with = "lenient::rating")]
    pub rating: u8,
    #[serde(default, alias = "imageUrl", deserialize_with = "lenient::string")]
    pub image: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub views: u64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: String,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Record for Review {
    const COLLECTION: &'static str = "reviews";

    fn id(&self) -> String {
        self.id.clone()
    }
}

impl Review {
    pub fn from_input(input: ReviewInput) -> Self {
        let now = now_iso();
        Self {
            id: new_id(),
            title: input.title.unwrap_or_default(),
            author: input.author.unwrap_or_default(),
            email: input.email.unwrap_or_default(),
            content: input.content.unwrap_or_default(),
            rating: input.rating.unwrap_or(5),
            image: input.image.unwrap_or_default(),
            views: input.views.unwrap_or(0),
            created_at: non_empty(input.created_at).unwrap_or_else(|| now.clone()),
            updated_at: Some(now),
        }
    }

    pub fn from_row(input: ReviewInput) -> Self {
        let id = input.id.clone();
        let mut r = Self::from_input(input);
        if let Some(id) = id {
            r.id = id;
        }
        r
    }

    pub fn apply(&mut self, input: ReviewInput) {
        if let Some(v) = input.title {
            self.title = v;
        }
        if let Some(v) = input.author {
            self.author = v;
        }
        if let Some(v) = input.email {
            self.email = v;
        }
        if let Some(v) = input.content {
            self.content = v;
        }
        if let Some(v) = input.rating {
            self.rating = v;
        }
        if let Some(v) = input.image {
            self.image = v;
        }
        if let Some(v) = input.views {
            self.views = v;
        }
        if let Some(v) = non_empty(input.created_at) {
            self.created_at = v;
        }
        self.updated_at = Some(now_iso());
    }
}

/// 후기 입력 (문자열은 trim, 평점은 1~5 외에는 5)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewInput {
    pub id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub email: Option<String>,
    pub content: Option<String>,
    pub rating: Option<u8>,
    pub image: Option<String>,
    pub views: Option<u64>,
    pub created_at: Option<String>,
}

impl ReviewInput {
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            id: non_empty(pick_trimmed(fields, &["id"])),
            title: pick_trimmed(fields, &["title"]),
            author: pick_trimmed(fields, &["author"]),
            email: pick_trimmed(fields, &["email"]),
            content: non_empty(pick_trimmed(fields, &["content"]))
                .or_else(|| pick_trimmed(fields, &["body", "content"])),
            rating: pick_value(fields, &["rating"]).map(lenient::parse_rating),
            image: non_empty(pick_trimmed(fields, &["image"]))
                .or_else(|| pick_trimmed(fields, &["imageUrl", "image"])),
            views: pick_value(fields, &["views"]).map(lenient::parse_count),
            created_at: pick_trimmed(fields, &["createdAt"]),
        }
    }

    pub fn has_title_and_author(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        filled(&self.title) && filled(&self.author)
    }
}

// ============ FAQ ============

fn default_icon() -> String {
    "❓".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Faq {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default = "default_icon", deserialize_with = "lenient::string")]
    pub icon: String,
    #[serde(rename = "q", alias = "question", default, deserialize_with = "lenient::string")]
    pub question: String,
    #[serde(rename = "a", alias = "answer", default, deserialize_with = "lenient::string")]
    pub answer: String,
}

impl Record for Faq {
    const COLLECTION: &'static str = "faqs";

    fn id(&self) -> String {
        self.id.clone()
    }
}

impl Faq {
    /// `faq_<밀리초 36진수>_<랜덤 6자>`
    pub fn new_id() -> String {
        let mut rng = rand::thread_rng();
        let suffix: String = (0..6)
            .map(|_| std::char::from_digit(rng.gen_range(0..36), 36).unwrap_or('0'))
            .collect();
        format!("faq_{}_{}", to_base36(Utc::now().timestamp_millis().max(0) as u64), suffix)
    }
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(std::char::from_digit((n % 36) as u32, 36).unwrap_or('0'));
        n /= 36;
    }
    digits.iter().rev().collect()
}

/// FAQ 입력 (`q`/`a` 또는 `question`/`answer`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FaqInput {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub icon: Option<String>,
    #[serde(default, alias = "question", deserialize_with = "lenient::opt_string")]
    pub q: Option<String>,
    #[serde(default, alias = "answer", deserialize_with = "lenient::opt_string")]
    pub a: Option<String>,
}

// ============ Settings ============

/// 사이트 설정 (단일 문서)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, deserialize_with = "lenient::string")]
    pub kakao_channel_url: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub meta_title: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub meta_description: String,
}

impl Settings {
    pub const DOCUMENT: &'static str = "settings";
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kakao_channel_url: "https://pf.kakao.com/_hGxgkxj".to_string(),
            meta_title: "타요 드라이브 | 방문 운전연수".to_string(),
            meta_description: "1:1 방문 운전연수, 전국 어디든 가능! 우수 강사진, 합리적 비용, 최고의 만족도."
                .to_string(),
        }
    }
}

/// 설정 수정 요청
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub kakao_channel_url: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub meta_title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub meta_description: Option<String>,
}

impl Settings {
    /// 카카오 URL 은 빈 값이면 유지, 메타 정보는 값이 오면 (빈 값이라도) 교체
    pub fn merged(&self, patch: SettingsPatch) -> Self {
        Self {
            kakao_channel_url: non_empty(patch.kakao_channel_url).unwrap_or_else(|| self.kakao_channel_url.clone()),
            meta_title: patch.meta_title.unwrap_or_else(|| self.meta_title.clone()),
            meta_description: patch.meta_description.unwrap_or_else(|| self.meta_description.clone()),
        }
    }
}

// ============ Recipient ============

/// 문자 수신자 (전화번호 중복 없음)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    #[serde(deserialize_with = "lenient::int_id")]
    pub id: i64,
    #[serde(deserialize_with = "lenient::string")]
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: String,
}

impl Record for Recipient {
    const COLLECTION: &'static str = "recipients";

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn assign_id(existing: &[Value]) -> Value {
        let max = existing
            .iter()
            .filter_map(|r| r.get("id"))
            .filter_map(lenient::parse_int_id)
            .max()
            .unwrap_or(0);
        Value::from(max + 1)
    }
}

/// 마지막으로 발급한 수신자 id. 삭제 후에도 번호를 재사용하지 않도록 별도 문서로 보관
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecipientSequence {
    #[serde(default)]
    pub last: i64,
}

impl RecipientSequence {
    pub const DOCUMENT: &'static str = "recipients_seq";

    /// 목록과 기록 중 큰 값 다음 번호
    pub fn next(&mut self, list: &[Recipient]) -> i64 {
        let max = list.iter().map(|r| r.id).max().unwrap_or(0);
        self.last = self.last.max(max) + 1;
        self.last
    }
}

// ============ Public content ============

/// 가격표 항목
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingOption {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub vehicle_type: String,
    #[serde(default, deserialize_with = "lenient::count")]
    pub hours: u64,
    #[serde(default, deserialize_with = "lenient::count")]
    pub price: u64,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub created_at: String,
}

impl Record for PricingOption {
    const COLLECTION: &'static str = "pricing";

    fn id(&self) -> String {
        self.id.clone()
    }
}

/// 운전연수 가능 지역
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Area {
    #[serde(deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Record for Area {
    const COLLECTION: &'static str = "areas";

    fn id(&self) -> String {
        self.id.clone()
    }
}
