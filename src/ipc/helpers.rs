use crate::error::{EngineError, EngineResult};
use crate::ipc::error::err;
use crate::ipc::types::{AppState, Request};
use crate::roster::Dashboard;
use serde_json::json;

pub fn required_str(params: &serde_json::Value, key: &str) -> EngineResult<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| {
            EngineError::validation(format!("missing {}", key))
                .with_details(json!({ "field": key }))
        })
}

pub fn optional_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Teacher ids arrive as numbers, or as numeric strings from select widgets.
pub fn required_i64(params: &serde_json::Value, key: &str) -> EngineResult<i64> {
    let v = params.get(key);
    v.and_then(|v| v.as_i64())
        .or_else(|| v.and_then(|v| v.as_str()).and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| {
            EngineError::validation(format!("missing or non-integer {}", key))
                .with_details(json!({ "field": key }))
        })
}

pub fn dashboard<'a>(
    state: &'a AppState,
    req: &Request,
) -> Result<&'a Dashboard, serde_json::Value> {
    state
        .dashboard
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

pub fn dashboard_mut<'a>(
    state: &'a mut AppState,
    req: &Request,
) -> Result<&'a mut Dashboard, serde_json::Value> {
    state
        .dashboard
        .as_mut()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}
