use crate::ipc::error::{err, ok, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::model::{Class, Student};
use crate::store;
use serde_json::json;
use std::path::PathBuf;
use uuid::Uuid;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string())
        }),
    )
}

fn handle_workspace_select(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, "bad_params", "missing params.path", None);
    };

    match store::open_store(&path) {
        Ok(conn) => {
            state.workspace = Some(path.clone());
            state.db = Some(conn);
            ok(&req.id, json!({ "workspacePath": path.to_string_lossy() }))
        }
        Err(e) => err(&req.id, "store_open_failed", format!("{e:?}"), None),
    }
}

fn sample_student(
    name: &str,
    phone: &str,
    parent_name: &str,
    parent_phone: &str,
    address: &str,
    date_of_birth: &str,
) -> Student {
    Student {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        phone: Some(phone.to_string()),
        parent_name: Some(parent_name.to_string()),
        parent_phone: Some(parent_phone.to_string()),
        address: Some(address.to_string()),
        date_of_birth: Some(date_of_birth.to_string()),
    }
}

fn seed_sample(conn: &rusqlite::Connection) -> Result<bool, HandlerErr> {
    let existing = store::load_classes(conn).map_err(HandlerErr::storage)?;
    if !existing.is_empty() {
        return Ok(false);
    }

    let sample = vec![
        Class {
            id: Uuid::new_v4().to_string(),
            name: "Class 5A".to_string(),
            students: vec![
                sample_student(
                    "Ram Sharma",
                    "+977-9841234567",
                    "Shyam Sharma",
                    "+977-9841234568",
                    "Kathmandu, Nepal",
                    "2010-05-15",
                ),
                sample_student(
                    "Sita Poudel",
                    "+977-9841234569",
                    "Gita Poudel",
                    "+977-9841234570",
                    "Lalitpur, Nepal",
                    "2010-08-22",
                ),
            ],
        },
        Class {
            id: Uuid::new_v4().to_string(),
            name: "Class 6B".to_string(),
            students: vec![sample_student(
                "Hari Thapa",
                "+977-9841234571",
                "Maya Thapa",
                "+977-9841234572",
                "Bhaktapur, Nepal",
                "2009-12-10",
            )],
        },
    ];
    store::save_classes(conn, &sample).map_err(HandlerErr::storage)?;
    Ok(true)
}

// Populates the demo roster the first time a workspace is opened; a no-op
// once any class exists.
fn handle_seed_sample(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    match seed_sample(conn) {
        Ok(seeded) => ok(&req.id, json!({ "seeded": seeded })),
        Err(error) => error.response(&req.id),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        "workspace.seedSample" => Some(handle_seed_sample(state, req)),
        _ => None,
    }
}
