//! Common Types Module
//!
//! 애플리케이션 전반에서 사용되는 공통 타입 정의

use std::fmt;

use serde::{Deserialize, Serialize};

/// 상담 진행 상태
///
/// 저장은 자유 텍스트(한글 라벨)로 하고, 집계/필터에서만 이 타입으로 분류한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReservationStatus {
    /// 상담신청중 (기본값)
    Requested,
    /// 상담확인
    Confirmed,
    /// 상담완료됨
    Completed,
    /// 상담취소
    Cancelled,
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 4] = [
        ReservationStatus::Requested,
        ReservationStatus::Confirmed,
        ReservationStatus::Completed,
        ReservationStatus::Cancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReservationStatus::Requested => "상담신청중",
            ReservationStatus::Confirmed => "상담확인",
            ReservationStatus::Completed => "상담완료됨",
            ReservationStatus::Cancelled => "상담취소",
        }
    }

    /// 라벨 분류. 관리자 화면과 같은 규칙 (완료 > 취소 > 확인 > 그 외 신청중)
    pub fn from_label(label: &str) -> Self {
        if label.contains("완료") {
            ReservationStatus::Completed
        } else if label.contains("취소") {
            ReservationStatus::Cancelled
        } else if label.contains("확인") {
            ReservationStatus::Confirmed
        } else {
            ReservationStatus::Requested
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 국내 휴대폰/일반 전화번호 (숫자만, 10~11자리)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// 하이픈/공백 제거, `+82`/`82` 국가번호는 `0` 으로 치환
    pub fn parse(input: &str) -> Option<Self> {
        let mut digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();

        if let Some(rest) = digits.strip_prefix("82") {
            digits = format!("0{rest}");
        }

        if (10..=11).contains(&digits.len()) {
            Some(Self(digits))
        } else {
            None
        }
    }

    /// 여러 번호가 섞인 텍스트 (줄바꿈, 공백, `,;/|` 구분)에서 유효한 번호만 중복 없이
    pub fn parse_many(raw: &str) -> Vec<Self> {
        let mut out: Vec<Self> = Vec::new();
        for token in raw.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '/' | '|')) {
            let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
            if !(10..=11).contains(&digits.len()) {
                continue;
            }
            let phone = Self(digits);
            if !out.contains(&phone) {
                out.push(phone);
            }
        }
        out
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// CSV / 일괄 가져오기 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// 모든 행을 새 레코드로 추가
    Append,
    /// 컬렉션을 가져온 행으로 교체
    Replace,
    /// id 가 같으면 병합, 아니면 추가
    #[default]
    Upsert,
}

/// 페이지네이션 정보 (page 는 1부터)
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
}

impl Pagination {
    /// 관리자 목록 기본 페이지 크기
    pub const DEFAULT_LIMIT: u32 = 15;
    pub const MAX_LIMIT: u32 = 100;

    pub fn new(page: u32, limit: u32, total: usize) -> Self {
        let limit = limit.clamp(1, Self::MAX_LIMIT);
        let total_pages = (total as u32).div_ceil(limit).max(1);
        let page = page.clamp(1, total_pages);
        Self {
            page,
            limit,
            total: total as u64,
            total_pages,
            has_next: page < total_pages,
        }
    }

    pub fn offset(&self) -> usize {
        ((self.page - 1) * self.limit) as usize
    }
}
