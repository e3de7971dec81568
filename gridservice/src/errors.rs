use std::fmt;
use std::time::Duration;

use basketatlas::utils::errors::{BasketError, ParseError};
use thiserror::Error;

/// Failures reported by a task platform.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlatformError {
    #[error("unknown session: {0}")]
    UnknownSession(String),
    #[error("unknown slot: {0}")]
    UnknownSlot(String),
    #[error("slot {0} holds no data yet")]
    SlotNotReady(String),
    #[error("task for slot {slot} failed: {message}")]
    TaskFailed { slot: String, message: String },
    #[error("timed out after {waited:?} with {pending} slot(s) pending")]
    Timeout { waited: Duration, pending: usize },
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("worker pool error: {0}")]
    WorkerPool(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChunkFailure {
    pub index: usize,
    pub message: String,
}

impl fmt::Display for ChunkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk {}: {}", self.index, self.message)
    }
}

/// Every chunk that failed for one request, in chunk order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkFailures(pub Vec<ChunkFailure>);

impl fmt::Display for ChunkFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|c| c.to_string()).collect();
        write!(f, "{} failed ({})", self.0.len(), parts.join("; "))
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
    #[error("Basket error: {0}")]
    Basket(#[from] BasketError),
    #[error("Chunks failed: {0}")]
    ChunksFailed(ChunkFailures),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ParseError> for ServiceError {
    fn from(e: ParseError) -> Self {
        ServiceError::Basket(e.into())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
