use crate::ipc::error::{engine_err, ok};
use crate::ipc::helpers::{dashboard, dashboard_mut, required_str};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_notes_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let dash = match dashboard(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let result = required_str(&req.params, "studentId")
        .and_then(|id| dash.notes(&id).map(|notes| json!({ "studentId": id, "notes": notes })));
    match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => engine_err(&req.id, e),
    }
}

fn handle_notes_add(state: &mut AppState, req: &Request) -> serde_json::Value {
    let dash = match dashboard_mut(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let result = required_str(&req.params, "studentId").and_then(|id| {
        let text = required_str(&req.params, "text")?;
        let notes = dash.add_note(&id, &text)?;
        Ok(json!({ "studentId": id, "notes": notes }))
    });
    match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => engine_err(&req.id, e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "notes.list" => Some(handle_notes_list(state, req)),
        "notes.add" => Some(handle_notes_add(state, req)),
        _ => None,
    }
}
