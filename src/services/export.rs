//! Batch result export as CSV, JSON or JSON Lines.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::BatchRow;

/// Byte order mark so spreadsheet apps open the CSV as UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const CSV_HEADERS: [&str; 10] = [
    "ไฟล์",
    "สถานะ",
    "ข้อความที่แยกได้",
    "เวลาประมวลผล (วินาที)",
    "จำนวนหน้า",
    "ชื่อบริษัท",
    "เลขประจำตัวผู้เสียภาษี",
    "หมายเลขโทรศัพท์",
    "ที่อยู่",
    "ข้อผิดพลาด",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export format options.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
    Jsonl,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Jsonl => "jsonl",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Json => "application/json",
            Self::Jsonl => "application/x-ndjson",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        self.as_str()
    }

    /// Serialize rows in this format.
    pub fn render(&self, rows: &[BatchRow]) -> Result<Vec<u8>, ExportError> {
        match self {
            Self::Csv => rows_to_csv(rows),
            Self::Json => rows_to_json(rows),
            Self::Jsonl => rows_to_jsonl(rows),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::Jsonl),
            other => Err(format!(
                "unknown export format '{}' (expected csv, json or jsonl)",
                other
            )),
        }
    }
}

/// CSV with a UTF-8 BOM and Thai column headers.
pub fn rows_to_csv(rows: &[BatchRow]) -> Result<Vec<u8>, ExportError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(UTF8_BOM.to_vec());
    wtr.write_record(CSV_HEADERS)?;

    for row in rows {
        let processing_time = format!("{:.2}", row.processing_time_secs);
        let page_count = row.page_count.to_string();
        wtr.write_record([
            row.filename.as_str(),
            row.status.thai_label(),
            row.preview.as_str(),
            processing_time.as_str(),
            page_count.as_str(),
            row.company_name.as_deref().unwrap_or(""),
            row.tax_id.as_deref().unwrap_or(""),
            row.phone.as_deref().unwrap_or(""),
            row.address.as_deref().unwrap_or(""),
            row.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}

/// Pretty-printed JSON array.
pub fn rows_to_json(rows: &[BatchRow]) -> Result<Vec<u8>, ExportError> {
    Ok(serde_json::to_vec_pretty(rows)?)
}

/// One JSON object per line.
pub fn rows_to_jsonl(rows: &[BatchRow]) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::new();
    for row in rows {
        serde_json::to_writer(&mut out, row)?;
        out.push(b'\n');
    }
    Ok(out)
}
