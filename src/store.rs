use crate::model::{Class, Ledger};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

pub const CLASSES_KEY: &str = "classes";
pub const LEDGER_KEY: &str = "attendanceRecords";

pub fn open_store(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join("hajiri.sqlite3");
    let conn = Connection::open(db_path)?;

    // The store is a plain key-value table: one key per top-level table,
    // each value holding the whole table as JSON.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )",
        [],
    )?;

    Ok(conn)
}

pub fn kv_get(conn: &Connection, key: &str) -> anyhow::Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?", [key], |r| {
            r.get::<_, String>(0)
        })
        .optional()?;
    Ok(value)
}

pub fn kv_set(conn: &Connection, key: &str, value: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO kv(key, value) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        (key, value),
    )?;
    Ok(())
}

pub fn load_classes(conn: &Connection) -> anyhow::Result<Vec<Class>> {
    match kv_get(conn, CLASSES_KEY)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Vec::new()),
    }
}

pub fn save_classes(conn: &Connection, classes: &[Class]) -> anyhow::Result<()> {
    kv_set(conn, CLASSES_KEY, &serde_json::to_string(classes)?)
}

pub fn load_ledger(conn: &Connection) -> anyhow::Result<Ledger> {
    match kv_get(conn, LEDGER_KEY)? {
        Some(raw) => Ok(serde_json::from_str(&raw)?),
        None => Ok(Ledger::new()),
    }
}

pub fn save_ledger(conn: &Connection, ledger: &Ledger) -> anyhow::Result<()> {
    kv_set(conn, LEDGER_KEY, &serde_json::to_string(ledger)?)
}
