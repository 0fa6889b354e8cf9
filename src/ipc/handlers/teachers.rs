use crate::error::{EngineError, EngineResult};
use crate::ipc::error::{engine_err, ok};
use crate::ipc::helpers::{dashboard, dashboard_mut, required_i64, required_str};
use crate::ipc::types::{AppState, Request};
use crate::mapping::parse_class_list;
use crate::roster::{Dashboard, NewTeacher};
use serde_json::json;

/// `classes` may be a list of tags or the comma-separated text of the admin form.
fn parse_classes(params: &serde_json::Value) -> EngineResult<Vec<String>> {
    match params.get("classes") {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(serde_json::Value::String(s)) => Ok(parse_class_list(s)),
        Some(serde_json::Value::Array(items)) => Ok(items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.to_string())
            .collect()),
        Some(_) => Err(EngineError::validation("classes must be a list or text")
            .with_details(json!({ "field": "classes" }))),
    }
}

fn teachers_create(
    dash: &mut Dashboard,
    params: &serde_json::Value,
) -> EngineResult<serde_json::Value> {
    let new = NewTeacher {
        name: required_str(params, "name")?,
        email: required_str(params, "email")?,
        subject: params
            .get("subject")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string(),
        classes: parse_classes(params)?,
    };
    let teacher = dash.add_teacher(new)?;
    Ok(json!({ "teacher": teacher }))
}

fn teachers_delete(
    dash: &mut Dashboard,
    params: &serde_json::Value,
) -> EngineResult<serde_json::Value> {
    let teacher_id = required_i64(params, "teacherId")?;
    dash.remove_teacher(teacher_id)?;
    Ok(json!({ "removed": teacher_id }))
}

fn teachers_map_student(
    dash: &mut Dashboard,
    params: &serde_json::Value,
) -> EngineResult<serde_json::Value> {
    let student_id = required_str(params, "studentId")?;
    let teacher_id = required_i64(params, "teacherId")?;
    let teacher = dash.map_student(&student_id, teacher_id)?;
    Ok(json!({ "teacher": teacher }))
}

fn handle_teachers_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    match dashboard(state, req) {
        Ok(dash) => ok(&req.id, json!({ "teachers": dash.teachers() })),
        Err(resp) => resp,
    }
}

fn handle_mut(
    state: &mut AppState,
    req: &Request,
    f: fn(&mut Dashboard, &serde_json::Value) -> EngineResult<serde_json::Value>,
) -> serde_json::Value {
    let dash = match dashboard_mut(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match f(dash, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => engine_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "teachers.list" => Some(handle_teachers_list(state, req)),
        "teachers.create" => Some(handle_mut(state, req, teachers_create)),
        "teachers.delete" => Some(handle_mut(state, req, teachers_delete)),
        "teachers.mapStudent" => Some(handle_mut(state, req, teachers_map_student)),
        _ => None,
    }
}
