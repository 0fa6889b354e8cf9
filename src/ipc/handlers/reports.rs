use crate::error::{EngineError, EngineResult};
use crate::ipc::error::{engine_err, ok};
use crate::ipc::helpers::{dashboard, optional_str, required_str};
use crate::ipc::types::{AppState, Request};
use crate::report::{CsvQuoting, ReportType};
use crate::roster::Dashboard;
use anyhow::Context;
use serde_json::json;
use std::path::PathBuf;

fn reports_compose(
    dash: &Dashboard,
    params: &serde_json::Value,
) -> EngineResult<serde_json::Value> {
    let raw_type = required_str(params, "reportType")?;
    let report_type = ReportType::parse(&raw_type).ok_or_else(|| {
        EngineError::validation("reportType must be one of: performance, attendance, progress")
            .with_details(json!({ "reportType": raw_type }))
    })?;
    let student_id = optional_str(params, "studentId");
    let text = dash.compose_report(report_type, student_id.as_deref())?;
    Ok(json!({ "reportType": report_type.label(), "text": text }))
}

fn reports_export_csv(
    dash: &Dashboard,
    params: &serde_json::Value,
) -> EngineResult<serde_json::Value> {
    let quoting = if params.get("quote").and_then(|v| v.as_bool()).unwrap_or(false) {
        CsvQuoting::Rfc4180
    } else {
        CsvQuoting::Raw
    };
    let csv = dash.export_csv(quoting);
    let out_path = optional_str(params, "outPath").map(PathBuf::from);
    if let Some(path) = out_path.as_ref() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory {}", parent.to_string_lossy())
            })?;
        }
        std::fs::write(path, format!("{}\n", csv))
            .with_context(|| format!("failed to write {}", path.to_string_lossy()))?;
        tracing::info!(path = %path.to_string_lossy(), "csv exported");
    }
    Ok(json!({
        "csv": csv,
        "rowCount": dash.students().len(),
        "outPath": out_path.map(|p| p.to_string_lossy().to_string()),
    }))
}

fn handle_reports_compose(state: &mut AppState, req: &Request) -> serde_json::Value {
    let dash = match dashboard(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match reports_compose(dash, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => engine_err(&req.id, e),
    }
}

fn handle_reports_export_csv(state: &mut AppState, req: &Request) -> serde_json::Value {
    let dash = match dashboard(state, req) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    match reports_export_csv(dash, &req.params) {
        Ok(result) => ok(&req.id, result),
        Err(e) => engine_err(&req.id, e),
    }
}

fn handle_analytics_subjects(state: &mut AppState, req: &Request) -> serde_json::Value {
    match dashboard(state, req) {
        Ok(dash) => ok(&req.id, json!({ "subjects": dash.subject_analytics() })),
        Err(resp) => resp,
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.compose" => Some(handle_reports_compose(state, req)),
        "reports.exportCsv" => Some(handle_reports_export_csv(state, req)),
        "analytics.subjects" => Some(handle_analytics_subjects(state, req)),
        _ => None,
    }
}
