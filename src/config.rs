use crate::calc::Thresholds;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Workspace opened at start-up, before any `workspace.select`.
    pub workspace: Option<PathBuf>,
    pub thresholds: Thresholds,
}

fn threshold_var(key: &str, default: i64) -> i64 {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<i64>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, default, "ignoring malformed threshold");
                default
            }
        },
        Err(_) => default,
    }
}

/// Log filter directive. Read before `Config` so that config warnings are logged.
pub fn log_filter_from_env() -> String {
    env::var("PERFBOARD_LOG")
        .or_else(|_| env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string())
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let workspace = env::var("PERFBOARD_WORKSPACE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let defaults = Thresholds::default();
        let thresholds = Thresholds {
            suggestion: threshold_var("PERFBOARD_SUGGESTION_THRESHOLD", defaults.suggestion),
            report_strength: threshold_var(
                "PERFBOARD_REPORT_STRENGTH_THRESHOLD",
                defaults.report_strength,
            ),
            report_weakness: threshold_var(
                "PERFBOARD_REPORT_WEAKNESS_THRESHOLD",
                defaults.report_weakness,
            ),
        };

        Self {
            workspace,
            thresholds,
        }
    }
}
