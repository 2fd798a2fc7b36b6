use crate::model::{AttendanceRecord, AttendanceStatus};
use crate::store;
use rusqlite::Connection;
use uuid::Uuid;

/// Result of a mark attempt. A locked pair rejects the write outright; the
/// caller reverts any optimistic state rather than retrying.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkOutcome {
    Saved(AttendanceRecord),
    Locked,
}

/// Marks one student for one (dateKey, classId) pair. The pair is created
/// lazily on first use. Re-marking removes the student's previous record
/// before inserting, so the pair holds at most one record per student.
///
/// The ledger has no roster visibility; callers are responsible for only
/// passing ids that exist.
pub fn mark(
    conn: &Connection,
    date_key: &str,
    class_id: &str,
    student_id: &str,
    status: AttendanceStatus,
) -> anyhow::Result<MarkOutcome> {
    let mut ledger = store::load_ledger(conn)?;
    let day = ledger
        .entry(date_key.to_string())
        .or_default()
        .entry(class_id.to_string())
        .or_default();

    if day.locked {
        return Ok(MarkOutcome::Locked);
    }

    day.records.retain(|r| r.student_id != student_id);
    let record = AttendanceRecord {
        id: Uuid::new_v4().to_string(),
        student_id: student_id.to_string(),
        status,
    };
    day.records.push(record.clone());

    store::save_ledger(conn, &ledger)?;
    Ok(MarkOutcome::Saved(record))
}

/// Snapshot of the records for a pair; empty when the pair was never touched.
pub fn records_for(
    conn: &Connection,
    date_key: &str,
    class_id: &str,
) -> anyhow::Result<Vec<AttendanceRecord>> {
    let ledger = store::load_ledger(conn)?;
    Ok(ledger
        .get(date_key)
        .and_then(|by_class| by_class.get(class_id))
        .map(|day| day.records.clone())
        .unwrap_or_default())
}

pub fn is_locked(conn: &Connection, date_key: &str, class_id: &str) -> anyhow::Result<bool> {
    let ledger = store::load_ledger(conn)?;
    Ok(ledger
        .get(date_key)
        .and_then(|by_class| by_class.get(class_id))
        .map(|day| day.locked)
        .unwrap_or(false))
}

/// End-of-day sign-off. Creates the pair if needed, then sets the lock.
/// Idempotent, and irreversible: no operation anywhere resets the flag.
pub fn lock(conn: &Connection, date_key: &str, class_id: &str) -> anyhow::Result<()> {
    let mut ledger = store::load_ledger(conn)?;
    ledger
        .entry(date_key.to_string())
        .or_default()
        .entry(class_id.to_string())
        .or_default()
        .locked = true;
    store::save_ledger(conn, &ledger)?;
    Ok(())
}
