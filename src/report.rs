use crate::model::Class;
use crate::store;
use anyhow::anyhow;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

/// One flattened attendance tuple for the report/CSV collaborator. Names are
/// resolved against the current roster and null when the referenced class or
/// student no longer exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRow {
    pub date: String,
    pub class_id: String,
    pub student_id: String,
    pub status: String,
    pub locked: bool,
    pub class_name: Option<String>,
    pub student_name: Option<String>,
}

pub fn parse_date_key(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| anyhow!("date must be YYYY-MM-DD"))
}

/// Rows for dateKeys within [start, end], optionally filtered to one class.
/// Ordered by dateKey ascending, then by the ledger's own class iteration
/// order; records keep their stored order within a day.
pub fn attendance_rows(
    conn: &Connection,
    start: NaiveDate,
    end: NaiveDate,
    class_filter: Option<&str>,
) -> anyhow::Result<Vec<AttendanceRow>> {
    let ledger = store::load_ledger(conn)?;
    let classes = store::load_classes(conn)?;

    let mut rows = Vec::new();
    for (date_key, by_class) in &ledger {
        let Ok(date) = parse_date_key(date_key) else {
            continue;
        };
        if date < start || date > end {
            continue;
        }
        for (class_id, day) in by_class {
            if let Some(filter) = class_filter {
                if class_id != filter {
                    continue;
                }
            }
            let class = classes.iter().find(|c| &c.id == class_id);
            for record in &day.records {
                rows.push(AttendanceRow {
                    date: date_key.clone(),
                    class_id: class_id.clone(),
                    student_id: record.student_id.clone(),
                    status: record.status.as_str().to_string(),
                    locked: day.locked,
                    class_name: class.map(|c| c.name.clone()),
                    student_name: student_name(class, &record.student_id),
                });
            }
        }
    }
    Ok(rows)
}

fn student_name(class: Option<&Class>, student_id: &str) -> Option<String> {
    class
        .and_then(|c| c.students.iter().find(|s| s.id == student_id))
        .map(|s| s.name.clone())
}
