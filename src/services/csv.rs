//! CSV import/export (`csv` 크레이트)
//!
//! 내보내기: BOM + 헤더 + 모든 값을 `"` 로 감싼 행 (`"` → `""`), 줄 끝 `\n`.
//! 엑셀에서 한글이 깨지지 않도록 BOM 을 붙인다.
//!
//! 가져오기: 첫 줄은 헤더, 빈 줄은 건너뜀. 닫히지 않은 따옴표는 파일 끝까지 한 칸으로 읽는다.

use csv::{QuoteStyle, ReaderBuilder, Terminator, Trim, WriterBuilder};
use serde_json::Value;
use thiserror::Error;

use crate::db::Fields;

const BOM: char = '\u{feff}';

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("CSV has no header row")]
    MissingHeader,

    #[error("malformed CSV: {0}")]
    Malformed(#[from] csv::Error),

    #[error("CSV output failed: {0}")]
    Output(String),
}

/// 헤더와 행들을 CSV 텍스트로
pub fn encode<I>(headers: &[&str], rows: I) -> Result<String, CsvError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    // 헤더는 필요할 때만 따옴표, 값은 항상
    let mut head = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    head.write_record(headers)?;
    let buf = head
        .into_inner()
        .map_err(|e| CsvError::Output(e.error().to_string()))?;

    let mut body = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);
    for row in rows {
        body.write_record(&row)?;
    }
    let bytes = body
        .into_inner()
        .map_err(|e| CsvError::Output(e.error().to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| CsvError::Output(e.to_string()))?;

    let mut out = String::with_capacity(text.len() + BOM.len_utf8());
    out.push(BOM);
    out.push_str(&text);
    Ok(out)
}

/// CSV 텍스트를 헤더 기준 레코드 목록으로
///
/// 헤더보다 짧은 행은 남은 칸을 빈 문자열로 채우고, 긴 행의 남는 값은 버린다.
pub fn parse(text: &str) -> Result<Vec<Fields>, CsvError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(CsvError::MissingHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        // 공백뿐인 줄
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }

        let mut fields = Fields::new();
        for (i, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let cell = record.get(i).unwrap_or_default();
            fields.insert(header.to_string(), Value::String(cell.to_string()));
        }
        rows.push(fields);
    }
    Ok(rows)
}
