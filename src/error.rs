use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Required input missing at submission time. Raised before any mutation.
    Validation,
    NotFound,
    /// Durable store write failed; local state is unchanged.
    Persistence,
    /// `commit` with no pending attendance mark.
    AccumulatorState,
}

impl ErrorKind {
    /// Stable wire code used in IPC error responses.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "bad_params",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Persistence => "persistence_failed",
            ErrorKind::AccumulatorState => "no_pending_mark",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl EngineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Persistence, message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message)
    }
}

impl std::error::Error for EngineError {}

/// Store plumbing errors surface to callers as persistence failures.
impl From<anyhow::Error> for EngineError {
    fn from(err: anyhow::Error) -> Self {
        EngineError::persistence(format!("{err:#}"))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
