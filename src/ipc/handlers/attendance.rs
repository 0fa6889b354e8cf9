use crate::error::{EngineError, EngineResult};
use crate::ipc::error::{engine_err, ok};
use crate::ipc::helpers::{dashboard_mut, required_str};
use crate::ipc::types::{AppState, Request};
use crate::model::AttendanceMark;
use crate::roster::Dashboard;
use serde_json::json;

fn parse_mark(params: &serde_json::Value) -> EngineResult<AttendanceMark> {
    let raw = required_str(params, "mark")?;
    AttendanceMark::parse(&raw).ok_or_else(|| {
        EngineError::validation("mark must be one of: present, absent")
            .with_details(json!({ "mark": raw }))
    })
}

fn attendance_mark(
    dash: &mut Dashboard,
    params: &serde_json::Value,
) -> EngineResult<serde_json::Value> {
    let student_id = required_str(params, "studentId")?;
    let mark = parse_mark(params)?;
    dash.mark_attendance(&student_id, mark)?;
    Ok(json!({ "studentId": student_id, "todayMark": mark }))
}

fn attendance_commit(
    dash: &mut Dashboard,
    params: &serde_json::Value,
) -> EngineResult<serde_json::Value> {
    let student_id = required_str(params, "studentId")?;
    let totals = dash.commit_attendance(&student_id)?;
    Ok(json!({
        "studentId": student_id,
        "totalDays": totals.total_days,
        "presentDays": totals.present_days,
        "attendance": totals.attendance,
    }))
}

fn handle_attendance_mark(state: &mut AppState, req: &Request) -> serde_json::Value {
    let dash = match dashboard_mut(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match attendance_mark(dash, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => engine_err(&req.id, e),
    }
}

fn handle_attendance_commit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let dash = match dashboard_mut(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match attendance_commit(dash, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => engine_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.mark" => Some(handle_attendance_mark(state, req)),
        "attendance.commit" => Some(handle_attendance_commit(state, req)),
        _ => None,
    }
}
