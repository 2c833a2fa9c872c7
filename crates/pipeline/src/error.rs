use serde::{Deserialize, Serialize};

use locator::LocateError;
use services::{LookupError, QueryError};

use crate::session::SessionError;

/// Failure classification surfaced to callers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Scrape target absent after its wait budget.
    NotFound,
    /// Coordinate lookup service unreachable or malformed.
    LookupFailed,
    /// Feature service unreachable or malformed.
    QueryFailed,
    /// Operation attempted against missing or busy session state.
    #[serde(rename = "PreconditionError")]
    Precondition,
    /// Session record could not be read or written.
    #[serde(rename = "StorageFailed")]
    Storage,
}

/// Structured error crossing the caller-facing boundary.
///
/// Component failures are converted here; nothing below the orchestrator
/// escapes as a panic or an unclassified error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineError {
    pub kind: ErrorKind,
    pub message: String,
}

impl PipelineError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for PipelineError {}

impl From<LocateError> for PipelineError {
    fn from(e: LocateError) -> Self {
        PipelineError::new(ErrorKind::NotFound, e.to_string())
    }
}

impl From<LookupError> for PipelineError {
    fn from(e: LookupError) -> Self {
        PipelineError::new(ErrorKind::LookupFailed, e.to_string())
    }
}

impl From<QueryError> for PipelineError {
    fn from(e: QueryError) -> Self {
        PipelineError::new(ErrorKind::QueryFailed, e.to_string())
    }
}

impl From<SessionError> for PipelineError {
    fn from(e: SessionError) -> Self {
        PipelineError::new(ErrorKind::Storage, e.to_string())
    }
}
