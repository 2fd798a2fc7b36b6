use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::helpers::{get_optional_str, get_required_str, parse_date};
use crate::ipc::types::{AppState, Request};
use crate::report;
use rusqlite::Connection;
use serde_json::json;

fn attendance_rows(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let start_raw = get_required_str(params, "startDate")?;
    let end_raw = get_required_str(params, "endDate")?;
    let start = parse_date(&start_raw, "startDate")?;
    let end = parse_date(&end_raw, "endDate")?;
    if end < start {
        return Err(HandlerErr::bad_params("endDate must not precede startDate"));
    }
    let class_filter = get_optional_str(params, "classId");

    let rows = report::attendance_rows(conn, start, end, class_filter.as_deref())
        .map_err(HandlerErr::storage)?;
    Ok(json!({ "rows": rows }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "report.attendanceRows" => {
            let Some(conn) = state.db.as_ref() else {
                return Some(err(&req.id, "no_workspace", "select a workspace first", None));
            };
            Some(match attendance_rows(conn, &req.params) {
                Ok(result) => ok(&req.id, result),
                Err(error) => error.response(&req.id),
            })
        }
        _ => None,
    }
}
