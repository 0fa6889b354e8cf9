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
    let exe = env!("CARGO_BIN_EXE_perfboardd");
    let mut child = Command::new(exe)
        .env_remove("PERFBOARD_WORKSPACE")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn perfboardd");
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

fn error_code(value: &serde_json::Value) -> &str {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
        .unwrap_or("")
}

fn setup(prefix: &str) -> (PathBuf, Child, ChildStdin, BufReader<ChildStdout>) {
    let workspace = temp_dir(prefix);
    let (child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "open",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "a1",
        "students.create",
        json!({
            "name": "Emily Davis",
            "email": "emily@school.com",
            "marks": { "Math": 86, "Science": 89, "English": 95, "History": 82, "Art": 70 }
        }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "a2",
        "students.create",
        json!({
            "name": "Wilson, James",
            "email": "james@school.com",
            "class": "Grade 10B",
            "marks": { "Math": 60, "Science": 78, "English": 81, "History": 70, "Art": 68 }
        }),
    );
    (workspace, child, stdin, reader)
}

#[test]
fn compose_class_and_student_reports() {
    let (_ws, mut child, mut stdin, mut reader) = setup("perfboard-reports-compose");

    let class_level = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.compose",
        json!({ "reportType": "attendance" }),
    );
    let text = class_level["text"].as_str().expect("text");
    assert!(text.starts_with("Attendance Report generated for 2 students.\nGenerated at: "));

    let student = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reports.compose",
        json!({ "reportType": "performance", "studentId": "24001" }),
    );
    assert_eq!(
        student["text"],
        "Report for Emily Davis\nClass: Grade 10A\nAvg Score: 0\nAttendance: 100%\n\
         Strengths: Math, Science, English\nNeeds Improvement: Art"
    );

    let bad_type = request(
        &mut stdin,
        &mut reader,
        "3",
        "reports.compose",
        json!({ "reportType": "gossip" }),
    );
    assert_eq!(error_code(&bad_type), "bad_params");

    let unknown = request(
        &mut stdin,
        &mut reader,
        "4",
        "reports.compose",
        json!({ "reportType": "progress", "studentId": "24999" }),
    );
    assert_eq!(error_code(&unknown), "not_found");

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn csv_export_writes_file() {
    let (ws, mut child, mut stdin, mut reader) = setup("perfboard-reports-csv");
    let out = ws.join("exports").join("roster.csv");

    let raw = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "reports.exportCsv",
        json!({ "outPath": out.to_string_lossy() }),
    );
    assert_eq!(raw["rowCount"], 2);
    let csv = raw["csv"].as_str().expect("csv");
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Name,Email,Class,Enrolled,Attendance,AvgScore");
    assert!(lines[2].starts_with("Wilson, James,james@school.com,Grade 10B,"));
    assert!(lines[2].ends_with(",100,0"));
    let written = std::fs::read_to_string(&out).expect("read csv");
    assert_eq!(written.trim_end(), csv);

    let quoted = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "reports.exportCsv",
        json!({ "quote": true }),
    );
    let csv = quoted["csv"].as_str().expect("csv");
    assert!(csv.lines().nth(2).expect("row").starts_with("\"Wilson, James\","));
    assert!(quoted["outPath"].is_null());

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn subject_analytics_over_roster() {
    let (_ws, mut child, mut stdin, mut reader) = setup("perfboard-analytics");

    let result = request_ok(&mut stdin, &mut reader, "1", "analytics.subjects", json!({}));
    let subjects = result["subjects"].as_array().expect("subjects");
    assert_eq!(subjects.len(), 5);
    assert_eq!(subjects[0]["subject"], "Math");
    assert_eq!(subjects[0]["avg"], 73);
    assert_eq!(subjects[0]["highest"], 86);
    assert_eq!(subjects[0]["lowest"], 60);

    drop(stdin);
    let _ = child.wait();
}

#[test]
fn notes_append_in_order() {
    let (_ws, mut child, mut stdin, mut reader) = setup("perfboard-notes");

    let empty = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "notes.list",
        json!({ "studentId": "24002" }),
    );
    assert_eq!(empty["notes"], json!([]));

    request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "notes.add",
        json!({ "studentId": "24002", "text": "Review fractions" }),
    );
    let second = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "notes.add",
        json!({ "studentId": "24002", "text": "Join study group" }),
    );
    assert_eq!(second["notes"], json!(["Review fractions", "Join study group"]));

    let other = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "notes.list",
        json!({ "studentId": "24001" }),
    );
    assert_eq!(other["notes"], json!([]));

    let blank = request(
        &mut stdin,
        &mut reader,
        "5",
        "notes.add",
        json!({ "studentId": "24002", "text": "  " }),
    );
    assert_eq!(error_code(&blank), "bad_params");

    let unknown = request(
        &mut stdin,
        &mut reader,
        "6",
        "notes.add",
        json!({ "studentId": "nobody", "text": "x" }),
    );
    assert_eq!(error_code(&unknown), "not_found");

    drop(stdin);
    let _ = child.wait();
}
