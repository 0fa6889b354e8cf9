//! Maps raw roster rows from the durable store into `StudentRecord`s.
//!
//! The store's row shape is not guaranteed, so `normalize` is total: every
//! missing or malformed field degrades to a safe default instead of failing.

use crate::clock::{Clock, DATE_FORMAT};
use crate::model::{Assessment, StudentRecord, Subject, SubjectScores};
use chrono::Datelike;
use serde_json::Value;

/// Field a document store uses for the identifier it assigns on insert.
pub const STORE_ID_FIELD: &str = "_id";

const DEFAULT_ASSESSMENT_MAX: f64 = 100.0;

/// Lenient numeric read: JSON numbers and numeric strings. Anything else is `None`.
pub fn coerce_number(v: Option<&Value>) -> Option<f64> {
    let n = match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|f| f.is_finite())
}

/// Numeric marks parse leniently; unparsable input counts as 0.
pub fn coerce_score(v: Option<&Value>) -> i64 {
    coerce_number(v).map(|f| f.round() as i64).unwrap_or(0)
}

fn first_present<'a>(raw: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| raw.get(*k))
        .find(|v| !v.is_null())
}

fn id_like(v: Option<&Value>) -> Option<String> {
    match v? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text(raw: &Value, keys: &[&str]) -> String {
    first_present(raw, keys)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn counter(raw: &Value, key: &str) -> u32 {
    coerce_number(raw.get(key))
        .filter(|f| *f >= 0.0)
        .map(|f| f.round().min(u32::MAX as f64) as u32)
        .unwrap_or(0)
}

fn resolve_id(raw: &Value, position_index: usize, clock: &dyn Clock) -> String {
    id_like(raw.get("id"))
        .or_else(|| id_like(raw.get("studentId")))
        .or_else(|| id_like(raw.get(STORE_ID_FIELD)))
        .unwrap_or_else(|| {
            let year = clock.today().year().rem_euclid(100);
            format!("{:02}{:03}", year, position_index + 1)
        })
}

fn normalize_assessment(v: &Value) -> Option<Assessment> {
    if !v.is_object() {
        return None;
    }
    Some(Assessment {
        title: text(v, &["title"]),
        date: text(v, &["date"]),
        score: coerce_number(v.get("score")).unwrap_or(0.0),
        max: coerce_number(v.get("max")).unwrap_or(DEFAULT_ASSESSMENT_MAX),
    })
}

fn normalize_subject_scores(v: Option<&Value>) -> SubjectScores {
    let Some(obj) = v.and_then(|v| v.as_object()) else {
        return SubjectScores::default();
    };
    let mut scores = SubjectScores::default();
    for (key, value) in obj {
        if let Some(subject) = Subject::parse(key) {
            scores.set(subject, coerce_score(Some(value)));
        }
    }
    scores
}

pub fn normalize(raw: &Value, position_index: usize, clock: &dyn Clock) -> StudentRecord {
    let enrollment_date = match text(raw, &["enrolled", "enrollmentDate"]) {
        s if s.is_empty() => clock.today().format(DATE_FORMAT).to_string(),
        s => s,
    };
    let attendance_ratio = coerce_number(first_present(raw, &["attendance", "attendanceRatio"]))
        .map(|f| f.round().clamp(0.0, 100.0) as i64)
        .unwrap_or(0);
    let assessments = raw
        .get("assessments")
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(normalize_assessment).collect())
        .unwrap_or_default();
    let total_days = counter(raw, "totalDays");
    let present_days = counter(raw, "presentDays").min(total_days);

    StudentRecord {
        id: resolve_id(raw, position_index, clock),
        name: text(raw, &["name"]),
        email: text(raw, &["email"]),
        class_tag: text(raw, &["class", "classTag"]),
        enrollment_date,
        attendance_ratio,
        assessments,
        subject_scores: normalize_subject_scores(raw.get("subjectScores")),
        total_days,
        present_days,
        today_mark: None,
    }
}
