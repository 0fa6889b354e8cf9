use crate::clock::SystemClock;
use crate::db::SqliteRecordStore;
use crate::error::EngineResult;
use crate::ipc::error::{engine_err, err, ok};
use crate::ipc::types::{AppState, Request};
use crate::roster::Dashboard;
use crate::store::MemoryNoteStore;
use serde_json::json;
use std::path::{Path, PathBuf};

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "workspacePath": state.workspace.as_ref().map(|p| p.to_string_lossy().to_string()),
            "studentCount": state.dashboard.as_ref().map(|d| d.students().len()),
            "thresholds": state.config.thresholds,
        }),
    )
}

/// Opens the roster store under `path` and replaces the session with a freshly
/// loaded one. Notes and pending marks from a previous workspace are dropped.
pub fn open_workspace(state: &mut AppState, path: &Path) -> EngineResult<usize> {
    let store = SqliteRecordStore::open(path)?;
    let dashboard = Dashboard::load(
        Box::new(store),
        Box::new(MemoryNoteStore::default()),
        Box::new(SystemClock),
        state.config.thresholds,
    )?;
    let count = dashboard.students().len();
    state.workspace = Some(path.to_path_buf());
    state.dashboard = Some(dashboard);
    tracing::info!(workspace = %path.to_string_lossy(), students = count, "workspace opened");
    Ok(count)
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

    match open_workspace(state, &path) {
        Ok(count) => ok(
            &req.id,
            json!({ "workspacePath": path.to_string_lossy(), "studentCount": count }),
        ),
        Err(e) => {
            tracing::error!(
                workspace = %path.to_string_lossy(),
                error = %e,
                "failed to open workspace"
            );
            engine_err(&req.id, e)
        }
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "workspace.select" => Some(handle_workspace_select(state, req)),
        _ => None,
    }
}
