//! Database Module
//!
//! 도메인 단위 저장소 API. 실제 파일 입출력은 `JsonStore` 가 담당하고,
//! 여기서는 엔티티별 규칙 (별칭 정규화, 가져오기 모드, 정렬, 검색) 을 적용한다.
//!
//! 핸들러는 `JsonStore` 를 직접 만지지 않고 항상 `Database` 를 거친다.

mod json_store;
pub mod lenient;
mod models;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

pub use json_store::{parse_collection, JsonStore, Record, StoreError, StoreHealth, StoreResult};
pub use models::*;

use crate::types::{ImportMode, PhoneNumber, ReservationStatus};

/// 공개 후기 목록 상한
pub const PUBLIC_REVIEW_LIMIT: usize = 60;

/// 상담 신청 목록 필터
#[derive(Debug, Clone, Default)]
pub struct ReservationFilter {
    /// 정확히 일치하는 상태 라벨
    pub status: Option<String>,
    /// 이름/연락처/지역/메모 부분 일치
    pub q: Option<String>,
}

impl ReservationFilter {
    fn matches(&self, r: &Reservation) -> bool {
        if let Some(status) = self.status.as_deref().filter(|s| !s.is_empty()) {
            if r.status != status {
                return false;
            }
        }
        match self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => [&r.name, &r.phone, &r.region, &r.memo]
                .iter()
                .any(|field| field.contains(q)),
            None => true,
        }
    }
}

/// CSV/일괄 가져오기 결과
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    /// 처리한 행 수
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
}

/// 관리자 대시보드 집계
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub reservations: ReservationStats,
    pub reviews: usize,
    pub faqs: usize,
    pub recipients: usize,
}

/// 데이터 접근 담당
pub struct Database {
    store: JsonStore,
}

impl Database {
    /// 데이터 디렉터리 열기 (실패 시 memory-only)
    pub async fn open(dir: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::open(dir).await,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            store: JsonStore::in_memory(),
        }
    }

    pub fn store(&self) -> &JsonStore {
        &self.store
    }

    pub async fn health(&self) -> StoreHealth {
        self.store.health().await
    }

    // ============ Reservations ============

    pub async fn list_reservations(&self, filter: &ReservationFilter) -> StoreResult<Vec<Reservation>> {
        Ok(self
            .store
            .list::<Reservation>()
            .await?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect())
    }

    pub async fn create_reservation(&self, input: ReservationInput) -> StoreResult<Reservation> {
        let created = self.store.insert(Reservation::from_input(input)).await?;
        tracing::info!(id = %created.id, "reservation created");
        Ok(created)
    }

    pub async fn update_reservation(&self, id: &str, input: ReservationInput) -> StoreResult<Option<Reservation>> {
        self.store.update(id, |r: &mut Reservation| r.apply(input)).await
    }

    pub async fn set_reservation_status(&self, id: &str, status: String) -> StoreResult<Option<Reservation>> {
        self.update_reservation(
            id,
            ReservationInput {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn delete_reservation(&self, id: &str) -> StoreResult<bool> {
        self.store.remove::<Reservation>(id).await
    }

    /// CSV 행 가져오기
    pub async fn import_reservations(&self, rows: Vec<Fields>, mode: ImportMode) -> StoreResult<ImportSummary> {
        let inputs: Vec<ReservationInput> = rows.iter().map(ReservationInput::from_fields).collect();

        let summary = self
            .store
            .mutate(move |list: &mut Vec<Reservation>| {
                import_into(list, inputs, mode, Reservation::from_row, Reservation::from_input, |r, input| r.apply(input))
            })
            .await?;

        tracing::info!(?mode, created = summary.created, updated = summary.updated, "reservations imported");
        Ok(summary)
    }

    // ============ Reviews ============

    pub async fn list_reviews(&self) -> StoreResult<Vec<Review>> {
        self.store.list::<Review>().await
    }

    /// 최신순 (createdAt 내림차순) 상위 `PUBLIC_REVIEW_LIMIT` 개
    pub async fn public_reviews(&self) -> StoreResult<Vec<Review>> {
        let mut reviews = self.list_reviews().await?;
        reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reviews.truncate(PUBLIC_REVIEW_LIMIT);
        Ok(reviews)
    }

    pub async fn create_review(&self, input: ReviewInput) -> StoreResult<Review> {
        self.store.insert(Review::from_input(input)).await
    }

    pub async fn update_review(&self, id: &str, input: ReviewInput) -> StoreResult<Option<Review>> {
        self.store.update(id, |r: &mut Review| r.apply(input)).await
    }

    pub async fn delete_review(&self, id: &str) -> StoreResult<bool> {
        self.store.remove::<Review>(id).await
    }

    /// 관리자 일괄 등록. 최종 목록 반환
    ///
    /// 행에 id 가 있으면 유지한다. `replace` 는 목록을 그대로 교체, `append` 는 앞에 추가하되
    /// 이미 있는 id 와 겹치는 행은 새 id 를 받는다.
    pub async fn bulk_reviews(&self, rows: Vec<Fields>, mode: ImportMode) -> StoreResult<Vec<Review>> {
        let incoming: Vec<Review> = rows
            .iter()
            .map(|f| Review::from_row(ReviewInput::from_fields(f)))
            .collect();

        self.store
            .mutate(move |list: &mut Vec<Review>| {
                if mode == ImportMode::Replace {
                    *list = incoming;
                } else {
                    for mut review in incoming {
                        if list.iter().any(|r| r.id == review.id) {
                            review.id = new_id();
                        }
                        list.insert(0, review);
                    }
                }
                list.clone()
            })
            .await
    }

    pub async fn import_reviews(&self, rows: Vec<Fields>, mode: ImportMode) -> StoreResult<ImportSummary> {
        let inputs: Vec<ReviewInput> = rows.iter().map(ReviewInput::from_fields).collect();

        let summary = self
            .store
            .mutate(move |list: &mut Vec<Review>| {
                import_into(list, inputs, mode, Review::from_row, Review::from_input, |r, input| r.apply(input))
            })
            .await?;

        tracing::info!(?mode, created = summary.created, updated = summary.updated, "reviews imported");
        Ok(summary)
    }

    // ============ FAQs ============

    pub async fn list_faqs(&self) -> StoreResult<Vec<Faq>> {
        self.store.list::<Faq>().await
    }

    pub async fn create_faq(&self, icon: Option<String>, q: String, a: String) -> StoreResult<Faq> {
        let faq = Faq {
            id: Faq::new_id(),
            icon: icon.filter(|i| !i.trim().is_empty()).unwrap_or_else(|| "❓".to_string()),
            question: q,
            answer: a,
        };
        self.store.insert(faq).await
    }

    /// 값이 온 필드만 교체
    pub async fn update_faq(&self, id: &str, input: FaqInput) -> StoreResult<Option<Faq>> {
        self.store
            .update(id, |faq: &mut Faq| {
                if let Some(icon) = input.icon {
                    faq.icon = icon;
                }
                if let Some(q) = input.q {
                    faq.question = q;
                }
                if let Some(a) = input.a {
                    faq.answer = a;
                }
            })
            .await
    }

    pub async fn delete_faq(&self, id: &str) -> StoreResult<bool> {
        self.store.remove::<Faq>(id).await
    }

    // ============ Settings ============

    pub async fn settings(&self) -> StoreResult<Settings> {
        self.store.read_document(Settings::DOCUMENT, Settings::default()).await
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> StoreResult<Settings> {
        let next = self.settings().await?.merged(patch);
        self.store.write_document(Settings::DOCUMENT, &next).await?;
        Ok(next)
    }

    // ============ Recipients ============

    /// 최신순. `search` 는 번호 숫자 또는 라벨 부분 일치
    pub async fn list_recipients(&self, search: Option<&str>) -> StoreResult<Vec<Recipient>> {
        let mut list = self.store.list::<Recipient>().await?;
        list.sort_by(|a, b| b.id.cmp(&a.id));

        let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) else {
            return Ok(list);
        };
        let digits: String = term.chars().filter(|c| c.is_ascii_digit()).collect();

        Ok(list
            .into_iter()
            .filter(|r| {
                (!digits.is_empty() && r.phone.contains(&digits))
                    || r.label.as_deref().is_some_and(|l| l.contains(term))
            })
            .collect())
    }

    /// 같은 번호가 있으면 라벨만 갱신
    pub async fn upsert_recipient(&self, phone: PhoneNumber, label: Option<String>) -> StoreResult<Recipient> {
        self.store
            .mutate_with_document(RecipientSequence::DOCUMENT, move |list: &mut Vec<Recipient>, seq: &mut RecipientSequence| {
                if let Some(existing) = list.iter_mut().find(|r| r.phone == phone.as_str()) {
                    existing.label = label;
                    return existing.clone();
                }
                let recipient = Recipient {
                    id: seq.next(list),
                    phone: phone.into_inner(),
                    label,
                    created_at: now_iso(),
                };
                list.insert(0, recipient.clone());
                recipient
            })
            .await
    }

    /// 일괄 추가. 이미 있는 번호는 건너뛰고 새로 추가된 수 반환
    pub async fn add_recipients(&self, phones: Vec<PhoneNumber>) -> StoreResult<usize> {
        self.store
            .mutate_with_document(RecipientSequence::DOCUMENT, move |list: &mut Vec<Recipient>, seq: &mut RecipientSequence| {
                let mut added = 0;
                for phone in phones {
                    if list.iter().any(|r| r.phone == phone.as_str()) {
                        continue;
                    }
                    let recipient = Recipient {
                        id: seq.next(list),
                        phone: phone.into_inner(),
                        label: None,
                        created_at: now_iso(),
                    };
                    list.insert(0, recipient);
                    added += 1;
                }
                added
            })
            .await
    }

    pub async fn delete_recipient(&self, id: i64) -> StoreResult<bool> {
        self.store.remove::<Recipient>(&id.to_string()).await
    }

    /// `ids` 가 비어 있으면 전체 삭제. 삭제된 수 반환
    pub async fn delete_recipients(&self, ids: &[i64]) -> StoreResult<usize> {
        let ids = ids.to_vec();
        self.store
            .mutate(move |list: &mut Vec<Recipient>| {
                let before = list.len();
                if ids.is_empty() {
                    list.clear();
                } else {
                    list.retain(|r| !ids.contains(&r.id));
                }
                before - list.len()
            })
            .await
    }

    // ============ Public content ============

    /// 차종, 시간, 등록일 순
    pub async fn pricing(&self) -> StoreResult<Vec<PricingOption>> {
        let mut items = self.store.list::<PricingOption>().await?;
        items.sort_by(|a, b| {
            a.vehicle_type
                .cmp(&b.vehicle_type)
                .then(a.hours.cmp(&b.hours))
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(items)
    }

    pub async fn areas(&self) -> StoreResult<Vec<Area>> {
        let mut items = self.store.list::<Area>().await?;
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    // ============ Stats ============

    pub async fn stats(&self) -> StoreResult<Stats> {
        let reservations = self.store.list::<Reservation>().await?;

        let mut by_status: BTreeMap<&'static str, usize> =
            ReservationStatus::ALL.iter().map(|s| (s.label(), 0)).collect();
        for r in &reservations {
            *by_status.entry(r.status().label()).or_default() += 1;
        }

        Ok(Stats {
            reservations: ReservationStats {
                total: reservations.len(),
                by_status,
            },
            reviews: self.store.list::<Review>().await?.len(),
            faqs: self.store.list::<Faq>().await?.len(),
            recipients: self.store.list::<Recipient>().await?.len(),
        })
    }
}

/// 가져오기 모드 공통 처리
///
/// - `Append`: 모든 행을 새 id 로 앞에 추가
/// - `Replace`: 목록을 가져온 행으로 교체 (행의 id 유지)
/// - `Upsert`: id 가 일치하면 병합, 아니면 새 id 로 앞에 추가
fn import_into<T, I>(
    list: &mut Vec<T>,
    inputs: Vec<I>,
    mode: ImportMode,
    keep_id: impl Fn(I) -> T,
    fresh: impl Fn(I) -> T,
    merge: impl Fn(&mut T, I),
) -> ImportSummary
where
    T: Record,
    I: HasId,
{
    let mut summary = ImportSummary {
        count: inputs.len(),
        ..Default::default()
    };

    match mode {
        ImportMode::Replace => {
            *list = inputs.into_iter().map(keep_id).collect();
            summary.created = list.len();
        }
        ImportMode::Append => {
            for input in inputs {
                list.insert(0, fresh(input));
                summary.created += 1;
            }
        }
        ImportMode::Upsert => {
            for input in inputs {
                let existing = input
                    .id()
                    .and_then(|id| list.iter().position(|r| r.id() == id));
                match existing {
                    Some(idx) => {
                        merge(&mut list[idx], input);
                        summary.updated += 1;
                    }
                    None => {
                        list.insert(0, fresh(input));
                        summary.created += 1;
                    }
                }
            }
        }
    }
    summary
}

/// 가져오기 입력에서 id 꺼내기
trait HasId {
    fn id(&self) -> Option<&str>;
}

impl HasId for ReservationInput {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl HasId for ReviewInput {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}
