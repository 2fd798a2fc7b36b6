use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::helpers::{get_optional_str, get_required_name, get_required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::StudentPatch;
use crate::roster;
use rusqlite::Connection;
use serde_json::json;

fn students_list(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let classes = roster::list_classes(conn).map_err(HandlerErr::storage)?;
    let Some(class) = roster::find_class(&classes, &class_id) else {
        return Err(HandlerErr::not_found("class not found"));
    };
    Ok(json!({ "students": &class.students }))
}

fn students_create(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let name = get_required_name(params, "name")?;

    let mut student = roster::new_student(&name);
    student.phone = get_optional_str(params, "phone");
    student.parent_name = get_optional_str(params, "parentName");
    student.parent_phone = get_optional_str(params, "parentPhone");
    student.address = get_optional_str(params, "address");
    student.date_of_birth = get_optional_str(params, "dateOfBirth");

    let created = roster::add_student(conn, &class_id, student).map_err(HandlerErr::storage)?;
    match created {
        Some(student) => Ok(json!({ "studentId": student.id.clone(), "student": student })),
        None => Err(HandlerErr::not_found("class not found")),
    }
}

fn students_update(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let student_id = get_required_str(params, "studentId")?;
    let Some(patch_raw) = params.get("patch") else {
        return Err(HandlerErr::bad_params("missing patch"));
    };
    let patch: StudentPatch = serde_json::from_value(patch_raw.clone())
        .map_err(|e| HandlerErr::bad_params(format!("invalid patch: {}", e)))?;
    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            return Err(HandlerErr::bad_params("name must not be empty"));
        }
    }

    let updated =
        roster::update_student(conn, &class_id, &student_id, &patch).map_err(HandlerErr::storage)?;
    match updated {
        Some(student) => Ok(json!({ "student": student })),
        None => Err(HandlerErr::not_found("class or student not found")),
    }
}

fn students_delete(conn: &Connection, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let class_id = get_required_str(params, "classId")?;
    let student_id = get_required_str(params, "studentId")?;
    let removed =
        roster::delete_student(conn, &class_id, &student_id).map_err(HandlerErr::storage)?;
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
        "students.list" => Some(handle(state, req, students_list)),
        "students.create" => Some(handle(state, req, students_create)),
        "students.update" => Some(handle(state, req, students_update)),
        "students.delete" => Some(handle(state, req, students_delete)),
        _ => None,
    }
}
