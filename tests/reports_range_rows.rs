use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_hajirid");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn hajirid");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

#[test]
fn rows_cover_the_inclusive_range_in_date_order() {
    let workspace = temp_dir("hajiri-report-range");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let class_a = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "classes.create",
        json!({ "name": "5A" }),
    )["classId"]
        .as_str()
        .expect("classId")
        .to_string();
    let class_b = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "classes.create",
        json!({ "name": "6B" }),
    )["classId"]
        .as_str()
        .expect("classId")
        .to_string();
    let ram = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "students.create",
        json!({ "classId": class_a, "name": "Ram" }),
    )["studentId"]
        .as_str()
        .expect("studentId")
        .to_string();
    let hari = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "students.create",
        json!({ "classId": class_b, "name": "Hari" }),
    )["studentId"]
        .as_str()
        .expect("studentId")
        .to_string();

    for (id, date, class_id, student, status) in [
        ("6", "2024-02-01", &class_a, &ram, "absent"),
        ("7", "2024-01-05", &class_a, &ram, "present"),
        ("8", "2024-01-10", &class_a, &ram, "present"),
        ("9", "2024-01-10", &class_b, &hari, "absent"),
    ] {
        request_ok(
            &mut stdin,
            &mut reader,
            id,
            "attendance.mark",
            json!({
                "dateKey": date,
                "classId": class_id,
                "studentId": student,
                "status": status
            }),
        );
    }
    request_ok(
        &mut stdin,
        &mut reader,
        "10",
        "attendance.lock",
        json!({ "dateKey": "2024-01-05", "classId": class_a }),
    );

    // Whole range: dates ascending, locked flag carried per pair.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "11",
        "report.attendanceRows",
        json!({ "startDate": "2024-01-01", "endDate": "2024-02-28" }),
    );
    let rows = result["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 4);
    let dates: Vec<_> = rows.iter().map(|r| r["date"].as_str().unwrap()).collect();
    assert_eq!(
        dates,
        vec!["2024-01-05", "2024-01-10", "2024-01-10", "2024-02-01"]
    );
    assert_eq!(rows[0]["locked"].as_bool(), Some(true));
    assert_eq!(rows[0]["className"].as_str(), Some("5A"));
    assert_eq!(rows[0]["studentName"].as_str(), Some("Ram"));
    assert_eq!(rows[3]["locked"].as_bool(), Some(false));

    // Inclusive bounds: a range ending on a marked date keeps that date.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "12",
        "report.attendanceRows",
        json!({ "startDate": "2024-01-06", "endDate": "2024-01-10" }),
    );
    let rows = result["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["date"].as_str() == Some("2024-01-10")));

    // Class filter.
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "13",
        "report.attendanceRows",
        json!({
            "startDate": "2024-01-01",
            "endDate": "2024-02-28",
            "classId": class_b
        }),
    );
    let rows = result["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["classId"].as_str(), Some(class_b.as_str()));
    assert_eq!(rows[0]["status"].as_str(), Some("absent"));

    // Inverted range is rejected.
    let resp = request(
        &mut stdin,
        &mut reader,
        "14",
        "report.attendanceRows",
        json!({ "startDate": "2024-02-01", "endDate": "2024-01-01" }),
    );
    assert_eq!(resp["ok"].as_bool(), Some(false));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn rows_for_orphaned_references_carry_null_names() {
    let workspace = temp_dir("hajiri-report-orphans");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    // A restored backup may reference entities the roster no longer has;
    // those rows still surface, with names left null for the report layer.
    let path = workspace.join("orphans.json");
    let doc = json!({
        "classes": [
            { "id": "c1", "name": "5A", "students": [ { "id": "s1", "name": "Ram" } ] }
        ],
        "attendanceRecords": {
            "2024-01-10": {
                "c1": {
                    "locked": false,
                    "records": [
                        { "id": "r1", "studentId": "s1", "status": "present" },
                        { "id": "r2", "studentId": "ghost", "status": "absent" }
                    ]
                },
                "gone-class": {
                    "locked": true,
                    "records": [
                        { "id": "r3", "studentId": "s9", "status": "present" }
                    ]
                }
            }
        }
    });
    std::fs::write(&path, doc.to_string()).expect("write backup");
    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "backup.restore",
        json!({ "inPath": path.to_string_lossy() }),
    );

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "report.attendanceRows",
        json!({ "startDate": "2024-01-01", "endDate": "2024-01-31" }),
    );
    let rows = result["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 3);

    let known = rows
        .iter()
        .find(|r| r["studentId"].as_str() == Some("s1"))
        .expect("known student row");
    assert_eq!(known["studentName"].as_str(), Some("Ram"));
    assert_eq!(known["className"].as_str(), Some("5A"));

    let ghost = rows
        .iter()
        .find(|r| r["studentId"].as_str() == Some("ghost"))
        .expect("ghost student row");
    assert!(ghost["studentName"].is_null());
    assert_eq!(ghost["className"].as_str(), Some("5A"));

    let gone = rows
        .iter()
        .find(|r| r["classId"].as_str() == Some("gone-class"))
        .expect("gone class row");
    assert!(gone["className"].is_null());
    assert!(gone["studentName"].is_null());
    assert_eq!(gone["locked"].as_bool(), Some(true));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
