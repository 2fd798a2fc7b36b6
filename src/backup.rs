use crate::model::{Class, Ledger};
use crate::store;
use anyhow::Context;
use chrono::Utc;
use rusqlite::Connection;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// The portable backup document: both persisted tables plus a timestamp,
/// exactly the shapes the store holds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub classes: Vec<Class>,
    pub attendance_records: Ledger,
    pub export_date: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub export_date: String,
    pub class_count: usize,
    pub date_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub class_count: usize,
    pub date_count: usize,
}

/// Shape failures that reject a restore wholesale, before any write.
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("backup is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("classes missing or malformed")]
    ClassesMalformed,
    #[error("attendanceRecords malformed")]
    LedgerMalformed,
}

pub fn export_backup(conn: &Connection, out_path: &Path) -> anyhow::Result<ExportSummary> {
    let doc = BackupDocument {
        classes: store::load_classes(conn)?,
        attendance_records: store::load_ledger(conn)?,
        export_date: Utc::now().to_rfc3339(),
    };

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }
    let text = serde_json::to_string_pretty(&doc).context("failed to serialize backup")?;
    std::fs::write(out_path, text)
        .with_context(|| format!("failed to write backup file {}", out_path.to_string_lossy()))?;

    Ok(ExportSummary {
        export_date: doc.export_date,
        class_count: doc.classes.len(),
        date_count: doc.attendance_records.len(),
    })
}

/// Validated payload of a restore document.
#[derive(Debug, Clone)]
pub struct RestorePayload {
    pub classes: Vec<Class>,
    pub ledger: Ledger,
}

/// Parses and shape-checks a backup document. `classes` must be present and
/// array-shaped; `attendanceRecords` may be absent or null (restored as
/// empty) but must otherwise be an object of the persisted shape.
pub fn parse_backup(text: &str) -> Result<RestorePayload, RestoreError> {
    let doc: serde_json::Value =
        serde_json::from_str(text).map_err(|e| RestoreError::InvalidJson(e.to_string()))?;

    let Some(classes_raw) = doc.get("classes").filter(|v| v.is_array()) else {
        return Err(RestoreError::ClassesMalformed);
    };
    let classes: Vec<Class> =
        serde_json::from_value(classes_raw.clone()).map_err(|_| RestoreError::ClassesMalformed)?;

    let ledger = match doc.get("attendanceRecords") {
        None => Ledger::new(),
        Some(v) if v.is_null() => Ledger::new(),
        Some(v) if v.is_object() => {
            serde_json::from_value(v.clone()).map_err(|_| RestoreError::LedgerMalformed)?
        }
        Some(_) => return Err(RestoreError::LedgerMalformed),
    };

    Ok(RestorePayload { classes, ledger })
}

/// Overwrites both tables from a validated payload. Atomic from the caller's
/// perspective only: the two tables are still two separate writes.
pub fn apply_restore(conn: &Connection, payload: &RestorePayload) -> anyhow::Result<ImportSummary> {
    store::save_classes(conn, &payload.classes)?;
    store::save_ledger(conn, &payload.ledger)?;
    Ok(ImportSummary {
        class_count: payload.classes.len(),
        date_count: payload.ledger.len(),
    })
}
