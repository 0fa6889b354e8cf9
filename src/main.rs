mod attendance;
mod calc;
mod clock;
mod config;
mod db;
mod error;
mod ids;
mod ipc;
mod mapping;
mod model;
mod normalize;
mod report;
mod roster;
mod store;

use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // stdout carries IPC responses; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config::log_filter_from_env()))
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();
}

fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = config::Config::from_env();
    let startup_workspace = config.workspace.clone();
    let mut state = ipc::AppState {
        config,
        workspace: None,
        dashboard: None,
    };
    if let Some(path) = startup_workspace {
        if let Err(e) = ipc::open_workspace(&mut state, &path) {
            tracing::error!(
                workspace = %path.to_string_lossy(),
                error = %e,
                "startup workspace not opened"
            );
        }
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "perfboardd ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                tracing::warn!(error = %e, "unparsable request line");
                let _ = writeln!(
                    stdout,
                    "{}",
                    serde_json::json!({
                        "ok": false,
                        "error": { "code": "bad_json", "message": e.to_string() }
                    })
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
}
