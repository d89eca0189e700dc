//! JSON File Store
//!
//! 컬렉션 하나당 파일 하나 (`<data_dir>/<collection>.json`).
//!
//! # Behaviour
//!
//! - 한 번 읽은 컬렉션은 메모리 캐시에서 제공
//! - 쓰기는 `<file>.tmp` 에 기록 후 rename (부분 기록 방지)
//! - 디렉터리 생성/파일 쓰기 실패 시 memory-only 모드로 전환, 이후 캐시만 사용
//! - read-modify-write 는 하나의 Mutex 아래에서 실행 (동시 요청 간 쓰기 유실 없음)
//! - 깨진 파일은 덮어쓰지 않고 `StoreError::Corrupt` 반환
//! - id 가 없는 행은 읽을 때 id 를 붙이고, 모양이 맞지 않는 행은 건너뛰되 파일에는 그대로 남긴다

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

/// 저장소 에러
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Bad JSON in {file}: the file must hold an array of objects")]
    Corrupt { file: String },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 컬렉션에 저장되는 레코드
pub trait Record: Serialize + DeserializeOwned + Send {
    /// 파일 이름 (확장자 제외)
    const COLLECTION: &'static str;

    fn id(&self) -> String;

    /// id 가 없는 행에 붙일 id
    fn assign_id(_existing: &[Value]) -> Value {
        Value::String(Uuid::new_v4().to_string())
    }
}

/// Health check 용 상태 정보
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreHealth {
    pub root: String,
    pub dir: String,
    pub mem_only: bool,
    pub cols: Vec<String>,
}

#[derive(Default)]
struct StoreState {
    cache: HashMap<String, Value>,
    mem_only: bool,
}

pub struct JsonStore {
    root: PathBuf,
    dir: PathBuf,
    state: Mutex<StoreState>,
}

impl JsonStore {
    /// 데이터 디렉터리를 열고 (없으면 생성) 저장소 생성
    ///
    /// 디렉터리를 만들 수 없으면 memory-only 모드로 시작한다.
    pub async fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let mut state = StoreState::default();

        if let Err(e) = tokio::fs::create_dir_all(&dir).await {
            tracing::warn!(dir = %dir.display(), error = %e, "data dir unavailable, memory-only mode on");
            state.mem_only = true;
        }

        Self {
            root: std::env::current_dir().unwrap_or_default(),
            dir,
            state: Mutex::new(state),
        }
    }

    /// 파일 없이 메모리에서만 동작하는 저장소
    pub fn in_memory() -> Self {
        Self {
            root: std::env::current_dir().unwrap_or_default(),
            dir: PathBuf::new(),
            state: Mutex::new(StoreState {
                cache: HashMap::new(),
                mem_only: true,
            }),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn is_mem_only(&self) -> bool {
        self.state.lock().await.mem_only
    }

    // ============ Collections ============

    /// 전체 목록 (저장 순서 그대로, 최신 항목이 앞)
    pub async fn list<T: Record>(&self) -> StoreResult<Vec<T>> {
        let mut state = self.state.lock().await;
        let (rows, _) = decode_rows::<T>(self.load_list::<T>(&mut state).await?);
        Ok(rows)
    }

    pub async fn find<T: Record>(&self, id: &str) -> StoreResult<Option<T>> {
        Ok(self.list::<T>().await?.into_iter().find(|r| r.id() == id))
    }

    /// 맨 앞에 추가
    pub async fn insert<T: Record + Clone>(&self, item: T) -> StoreResult<T> {
        let saved = item.clone();
        self.mutate(move |rows: &mut Vec<T>| rows.insert(0, item)).await?;
        Ok(saved)
    }

    /// id 가 일치하는 레코드에 `apply` 적용, 없으면 `None` (파일 변경 없음)
    pub async fn update<T, F>(&self, id: &str, apply: F) -> StoreResult<Option<T>>
    where
        T: Record + Clone,
        F: FnOnce(&mut T),
    {
        let mut state = self.state.lock().await;
        let (mut rows, skipped) = decode_rows::<T>(self.load_list::<T>(&mut state).await?);

        let Some(row) = rows.iter_mut().find(|r| r.id() == id) else {
            return Ok(None);
        };
        apply(row);
        let updated = row.clone();

        self.persist(&mut state, T::COLLECTION, encode_rows(&rows, skipped)?).await?;
        Ok(Some(updated))
    }

    /// 삭제, 실제로 지워졌으면 `true`
    pub async fn remove<T: Record>(&self, id: &str) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        let (mut rows, skipped) = decode_rows::<T>(self.load_list::<T>(&mut state).await?);

        let before = rows.len();
        rows.retain(|r| r.id() != id);
        if rows.len() == before {
            return Ok(false);
        }

        self.persist(&mut state, T::COLLECTION, encode_rows(&rows, skipped)?).await?;
        Ok(true)
    }

    /// 컬렉션 전체 교체 (읽지 못한 행도 함께 버림)
    pub async fn replace<T: Record>(&self, rows: Vec<T>) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        self.persist(&mut state, T::COLLECTION, serde_json::to_value(&rows)?).await
    }

    /// 락을 잡은 채로 읽고-고치고-쓰기
    pub async fn mutate<T, R, F>(&self, f: F) -> StoreResult<R>
    where
        T: Record,
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let mut state = self.state.lock().await;
        let (mut rows, skipped) = decode_rows::<T>(self.load_list::<T>(&mut state).await?);

        let out = f(&mut rows);

        self.persist(&mut state, T::COLLECTION, encode_rows(&rows, skipped)?).await?;
        Ok(out)
    }

    /// 컬렉션과 문서를 같은 락 아래에서 함께 수정 (예: 수신자 목록 + 발급 번호)
    pub async fn mutate_with_document<T, D, R, F>(&self, name: &str, f: F) -> StoreResult<R>
    where
        T: Record,
        D: Serialize + DeserializeOwned + Default,
        F: FnOnce(&mut Vec<T>, &mut D) -> R,
    {
        let mut state = self.state.lock().await;
        let (mut rows, skipped) = decode_rows::<T>(self.load_list::<T>(&mut state).await?);
        let mut doc: D = match self.load_document(&mut state, name).await? {
            Some(value) => decode_document(name, value)?,
            None => D::default(),
        };

        let out = f(&mut rows, &mut doc);

        self.persist(&mut state, T::COLLECTION, encode_rows(&rows, skipped)?).await?;
        self.persist(&mut state, name, serde_json::to_value(&doc)?).await?;
        Ok(out)
    }

    // ============ Documents ============

    /// 단일 객체 문서 (settings 등). 파일이 없으면 `default`
    ///
    /// 객체가 아니거나 모양이 맞지 않으면 `Corrupt` (다음 쓰기로 덮어쓰지 않도록)
    pub async fn read_document<T>(&self, name: &str, default: T) -> StoreResult<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut state = self.state.lock().await;
        match self.load_document(&mut state, name).await? {
            Some(value) => decode_document(name, value),
            None => Ok(default),
        }
    }

    pub async fn write_document<T: Serialize>(&self, name: &str, doc: &T) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        self.persist(&mut state, name, serde_json::to_value(doc)?).await
    }

    // ============ Health ============

    pub async fn health(&self) -> StoreHealth {
        let state = self.state.lock().await;
        let mut cols: Vec<String> = state.cache.keys().cloned().collect();
        cols.sort();

        StoreHealth {
            root: self.root.display().to_string(),
            dir: self.dir.display().to_string(),
            mem_only: state.mem_only,
            cols,
        }
    }

    // ============ Internals ============

    fn file_of(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    async fn load_list<T: Record>(&self, state: &mut StoreState) -> StoreResult<Vec<Value>> {
        let col = T::COLLECTION;
        if let Some(Value::Array(rows)) = state.cache.get(col) {
            return Ok(rows.clone());
        }

        let mut rows = if state.mem_only {
            Vec::new()
        } else {
            let path = self.file_of(col);
            match tokio::fs::read_to_string(&path).await {
                Ok(text) => parse_collection(&text).ok_or_else(|| {
                    tracing::error!(file = %path.display(), "collection file is not valid JSON");
                    corrupt(col)
                })?,
                Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
                Err(source) => return Err(StoreError::Io { path, source }),
            }
        };

        let filled = fill_missing_ids::<T>(&mut rows);
        if filled > 0 {
            tracing::info!(collection = col, filled, "assigned ids to rows without one");
        }

        state.cache.insert(col.to_string(), Value::Array(rows.clone()));
        Ok(rows)
    }

    /// 문서 원본. 없으면 `None`, 객체가 아니면 `Corrupt`
    async fn load_document(&self, state: &mut StoreState, name: &str) -> StoreResult<Option<Value>> {
        if let Some(value) = state.cache.get(name) {
            return Ok(Some(value.clone()));
        }
        if state.mem_only {
            return Ok(None);
        }

        let path = self.file_of(name);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        let raw = text.trim().trim_start_matches('\u{feff}');
        if raw.is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Value>(raw) {
            Ok(value @ Value::Object(_)) => {
                state.cache.insert(name.to_string(), value.clone());
                Ok(Some(value))
            }
            _ => {
                tracing::error!(file = %path.display(), "document is not a JSON object");
                Err(corrupt(name))
            }
        }
    }

    /// 캐시 갱신 후 파일 기록. 기록 실패는 에러가 아니라 memory-only 전환.
    async fn persist(&self, state: &mut StoreState, name: &str, value: Value) -> StoreResult<()> {
        let mut text = serde_json::to_string_pretty(&value)?;
        text.push('\n');
        state.cache.insert(name.to_string(), value);

        if state.mem_only {
            return Ok(());
        }

        let path = self.file_of(name);
        let tmp = path.with_extension("json.tmp");
        let written = match tokio::fs::write(&tmp, text).await {
            Ok(()) => tokio::fs::rename(&tmp, &path).await,
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            tracing::error!(file = %path.display(), error = %e, "write failed, memory-only mode on");
            state.mem_only = true;
        }
        Ok(())
    }
}

fn corrupt(name: &str) -> StoreError {
    StoreError::Corrupt {
        file: format!("{name}.json"),
    }
}

/// 행 단위 디코딩. 모양이 맞지 않는 행은 원본 그대로 따로 돌려준다
fn decode_rows<T: Record>(rows: Vec<Value>) -> (Vec<T>, Vec<Value>) {
    let mut decoded = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();

    for row in rows {
        match serde_json::from_value::<T>(row.clone()) {
            Ok(record) => decoded.push(record),
            Err(e) => {
                tracing::warn!(collection = T::COLLECTION, error = %e, "skipping row that does not match the record shape");
                skipped.push(row);
            }
        }
    }
    (decoded, skipped)
}

/// 기록용 배열. 읽지 못한 행은 버리지 않고 뒤에 붙인다
fn encode_rows<T: Record>(rows: &[T], skipped: Vec<Value>) -> StoreResult<Value> {
    let mut out = match serde_json::to_value(rows)? {
        Value::Array(out) => out,
        other => vec![other],
    };
    out.extend(skipped);
    Ok(Value::Array(out))
}

fn decode_document<T: DeserializeOwned>(name: &str, value: Value) -> StoreResult<T> {
    serde_json::from_value(value).map_err(|e| {
        tracing::error!(document = name, error = %e, "document does not match its shape");
        corrupt(name)
    })
}

/// id 가 없거나 비어 있는 객체 행에 `T::assign_id` 로 id 부여
fn fill_missing_ids<T: Record>(rows: &mut [Value]) -> usize {
    let mut filled = 0;
    for i in 0..rows.len() {
        let missing = match rows[i].get("id") {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if !missing || !rows[i].is_object() {
            continue;
        }

        let id = T::assign_id(rows);
        if let Some(obj) = rows[i].as_object_mut() {
            obj.insert("id".to_string(), id);
            filled += 1;
        }
    }
    filled
}

/// 컬렉션 파일 파싱
///
/// - 빈 파일 → 빈 목록
/// - 배열 → 그대로
/// - `{"items": [...]}` / `{"reviews": [...]}` → 내부 배열
/// - 그 밖의 JSON → 빈 목록
/// - 파싱 실패 시 `}{` 를 `},{` 로 고치고 `[...]` 로 감싸 한 번 더 시도
///
/// 복구도 실패하면 `None`.
pub fn parse_collection(text: &str) -> Option<Vec<Value>> {
    let raw = text.trim().trim_start_matches('\u{feff}');
    if raw.is_empty() {
        return Some(Vec::new());
    }

    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Some(unwrap_rows(value));
    }

    let repaired = format!("[{}]", join_concatenated_objects(raw));
    serde_json::from_str::<Value>(&repaired).ok().map(unwrap_rows)
}

fn unwrap_rows(value: Value) -> Vec<Value> {
    match value {
        Value::Array(rows) => rows,
        Value::Object(mut obj) => ["reviews", "items"]
            .iter()
            .find_map(|key| match obj.remove(*key) {
                Some(Value::Array(rows)) => Some(rows),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// `}` 와 `{` 사이가 공백뿐이면 콤마 삽입
fn join_concatenated_objects(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 16);
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if c != '}' {
            continue;
        }

        let mut gap = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_whitespace() {
                gap.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if chars.peek() == Some(&'{') {
            out.push(',');
        }
        out.push_str(&gap);
    }
    out
}
