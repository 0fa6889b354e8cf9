use std::path::PathBuf;

use crate::config::Config;
use crate::roster::Dashboard;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub workspace: Option<PathBuf>,
    pub dashboard: Option<Dashboard>,
}
