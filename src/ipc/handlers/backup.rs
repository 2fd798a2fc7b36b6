use crate::backup;
use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::helpers::get_required_str;
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;
use std::path::PathBuf;

fn backup_export(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let out_path = PathBuf::from(get_required_str(params, "outPath")?);
    let summary = backup::export_backup(conn, &out_path)
        .map_err(|e| HandlerErr::new("backup_export_failed", e.to_string()))?;
    Ok(json!({
        "path": out_path.to_string_lossy(),
        "exportDate": summary.export_date,
        "classCount": summary.class_count,
        "dateCount": summary.date_count
    }))
}

fn backup_restore(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let in_path = PathBuf::from(get_required_str(params, "inPath")?);
    let text = std::fs::read_to_string(&in_path).map_err(|e| {
        HandlerErr::new(
            "backup_read_failed",
            format!("failed to read {}: {}", in_path.to_string_lossy(), e),
        )
    })?;

    // Validation is all-or-nothing: nothing is written unless the whole
    // document parses into the persisted shapes.
    let payload =
        backup::parse_backup(&text).map_err(|e| HandlerErr::new("bad_backup", e.to_string()))?;
    let summary = backup::apply_restore(conn, &payload).map_err(HandlerErr::storage)?;

    Ok(json!({
        "classCount": summary.class_count,
        "dateCount": summary.date_count
    }))
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
        "backup.export" => Some(handle(state, req, backup_export)),
        "backup.restore" => Some(handle(state, req, backup_restore)),
        _ => None,
    }
}
