use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::helpers::{get_required_name, get_required_str};
use crate::ipc::types::{AppState, Request};
use crate::roster;
use rusqlite::Connection;
use serde_json::json;

fn classes_list(conn: &Connection) -> Result<serde_json::Value, HandlerErr> {
    let classes = roster::list_classes(conn).map_err(HandlerErr::storage)?;
    let classes_json: Vec<serde_json::Value> = classes
        .iter()
        .map(|c| {
            json!({
                "id": c.id,
                "name": c.name,
                "studentCount": c.students.len(),
                "students": &c.students,
            })
        })
        .collect();
    Ok(json!({ "classes": classes_json }))
}

fn classes_create(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let name = get_required_name(params, "name")?;
    let class = roster::add_class(conn, &name).map_err(HandlerErr::storage)?;
    Ok(json!({ "classId": class.id, "name": class.name }))
}

fn classes_update(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let name = get_required_name(params, "name")?;
    let updated = roster::update_class(conn, &class_id, &name).map_err(HandlerErr::storage)?;
    match updated {
        Some(class) => Ok(json!({ "classId": class.id, "name": class.name })),
        None => Err(HandlerErr::not_found("class not found")),
    }
}

fn classes_delete(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let removed = roster::delete_class(conn, &class_id).map_err(HandlerErr::storage)?;
    Ok(json!({ "removed": removed }))
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
        "classes.list" => Some(handle(state, req, |conn, _| classes_list(conn))),
        "classes.create" => Some(handle(state, req, classes_create)),
        "classes.update" => Some(handle(state, req, classes_update)),
        "classes.delete" => Some(handle(state, req, classes_delete)),
        _ => None,
    }
}
