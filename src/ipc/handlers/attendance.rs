use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::helpers::{get_date_key, get_required_str, get_status};
use crate::ipc::types::{AppState, Request};
use crate::ledger::{self, MarkOutcome};
use crate::roster;
use rusqlite::Connection;
use serde_json::json;

fn attendance_mark(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let date_key = get_date_key(params, "dateKey")?;
    let class_id = get_required_str(params, "classId")?;
    let student_id = get_required_str(params, "studentId")?;
    let status = get_status(params, "status")?;

    // The ledger itself is roster-blind; membership is checked here so stale
    // ids cannot create orphaned records.
    let classes = roster::list_classes(conn).map_err(HandlerErr::storage)?;
    if roster::find_student(&classes, &class_id, &student_id).is_none() {
        return Err(HandlerErr::not_found("student not found in class"));
    }

    match ledger::mark(conn, &date_key, &class_id, &student_id, status)
        .map_err(HandlerErr::storage)?
    {
        MarkOutcome::Saved(record) => Ok(json!({ "record": record })),
        MarkOutcome::Locked => Err(HandlerErr::new(
            "locked",
            "attendance for this day and class is locked",
        )),
    }
}

/// Composite read for one (dateKey, classId) pair: the stored records, the
/// lock flag, the class roster joined with each student's current status,
/// and the summary counts. Unknown pairs read as unlocked and empty.
fn attendance_open(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let date_key = get_date_key(params, "dateKey")?;
    let class_id = get_required_str(params, "classId")?;

    let records = ledger::records_for(conn, &date_key, &class_id).map_err(HandlerErr::storage)?;
    let locked = ledger::is_locked(conn, &date_key, &class_id).map_err(HandlerErr::storage)?;
    let classes = roster::list_classes(conn).map_err(HandlerErr::storage)?;
    let class = roster::find_class(&classes, &class_id);

    let students_json: Vec<serde_json::Value> = class
        .map(|c| c.students.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|s| {
            let status = records
                .iter()
                .find(|r| r.student_id == s.id)
                .map(|r| r.status.as_str());
            json!({
                "id": s.id,
                "name": s.name,
                "status": status
            })
        })
        .collect();

    let total = students_json.len() as i64;
    let present = records
        .iter()
        .filter(|r| r.status.as_str() == "present")
        .count() as i64;
    let absent = records.len() as i64 - present;

    Ok(json!({
        "dateKey": date_key,
        "classId": class_id,
        "locked": locked,
        "records": records,
        "students": students_json,
        "summary": {
            "total": total,
            "present": present,
            "absent": absent,
            "unmarked": total - present - absent
        }
    }))
}

fn attendance_lock(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let date_key = get_date_key(params, "dateKey")?;
    let class_id = get_required_str(params, "classId")?;

    let classes = roster::list_classes(conn).map_err(HandlerErr::storage)?;
    if roster::find_class(&classes, &class_id).is_none() {
        return Err(HandlerErr::not_found("class not found"));
    }

    ledger::lock(conn, &date_key, &class_id).map_err(HandlerErr::storage)?;
    Ok(json!({ "locked": true }))
}

fn handle(
    state: &mut AppState,
    req: &Request,
    f: impl Fn(&Connection, &serde_json::Value) -> Result<serde_json::Value, HandlerErr>,
) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match f(conn, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.mark" => Some(handle(state, req, attendance_mark)),
        "attendance.open" => Some(handle(state, req, attendance_open)),
        "attendance.lock" => Some(handle(state, req, attendance_lock)),
        _ => None,
    }
}
