use crate::calc;
use crate::error::{EngineError, EngineResult};
use crate::ipc::error::{engine_err, ok};
use crate::ipc::helpers::{dashboard, dashboard_mut, optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::StudentRecord;
use crate::roster::{Dashboard, NewStudent};
use serde_json::json;

fn student_json(rec: &StudentRecord) -> serde_json::Value {
    let mut v = json!(rec);
    v["avgScore"] = json!(calc::average_score(&rec.assessments));
    v
}

fn students_list(dash: &Dashboard) -> serde_json::Value {
    let students: Vec<serde_json::Value> = dash.students().iter().map(student_json).collect();
    json!({ "students": students })
}

fn students_create(
    dash: &mut Dashboard,
    params: &serde_json::Value,
) -> EngineResult<serde_json::Value> {
    let marks = match params.get("marks") {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::Object(m)) => Some(m.clone()),
        Some(_) => {
            return Err(EngineError::validation("marks must be an object")
                .with_details(json!({ "field": "marks" })))
        }
    };
    let new = NewStudent {
        name: required_str(params, "name")?,
        email: required_str(params, "email")?,
        class_tag: optional_str(params, "class"),
        marks,
    };
    let rec = dash.add_student(new)?;
    Ok(json!({ "student": student_json(&rec) }))
}

fn students_delete(
    dash: &mut Dashboard,
    params: &serde_json::Value,
) -> EngineResult<serde_json::Value> {
    let student_id = required_str(params, "studentId")?;
    dash.remove_student(&student_id)?;
    Ok(json!({ "removed": student_id }))
}

fn students_performance(
    dash: &Dashboard,
    params: &serde_json::Value,
) -> EngineResult<serde_json::Value> {
    let student_id = required_str(params, "studentId")?;
    let model = dash.performance(&student_id)?;
    Ok(json!(model))
}

fn handle_students_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    match dashboard(state, req) {
        Ok(dash) => ok(&req.id, students_list(dash)),
        Err(resp) => resp,
    }
}

fn handle_students_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let dash = match dashboard_mut(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match students_create(dash, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => engine_err(&req.id, e),
    }
}

fn handle_students_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let dash = match dashboard_mut(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match students_delete(dash, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => engine_err(&req.id, e),
    }
}

fn handle_students_performance(state: &mut AppState, req: &Request) -> serde_json::Value {
    let dash = match dashboard(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match students_performance(dash, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => engine_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_students_list(state, req)),
        "students.create" => Some(handle_students_create(state, req)),
        "students.delete" => Some(handle_students_delete(state, req)),
        "students.performance" => Some(handle_students_performance(state, req)),
        _ => None,
    }
}
