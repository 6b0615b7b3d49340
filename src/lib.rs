pub mod catalog;
pub mod core;
pub mod engine;
pub mod formats_cmd;
pub mod report;
pub mod service;
pub mod storage;
pub mod submit_cmd;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use engine::{Notification, Notifier, Orchestrator, Severity};
pub use storage::{CsvExporter, JsonlWriter};

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("{0}")]
    Message(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("network error: {0}")]
    Network(String),
    #[error("{operation} responded with status {status}")]
    Status { operation: &'static str, status: u16 },
    #[error("failed to decode {operation} response: {reason}")]
    Decode { operation: &'static str, reason: String },
    #[error("processing failed: {0}")]
    ProcessingFailed(String),
    #[error("no terminal status after {0:?}")]
    Timeout(Duration),
    #[error("benchmark cancelled")]
    Cancelled,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type BenchResult<T> = Result<T, BenchError>;

/// Coarse classification of a failure, used for logging and fallback reasons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    HttpStatus,
    ProcessingFailed,
    Timeout,
    Cancelled,
    Other,
}

impl BenchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            BenchError::Http(_) | BenchError::Network(_) => FailureKind::Network,
            BenchError::Status { .. } => FailureKind::HttpStatus,
            BenchError::ProcessingFailed(_) => FailureKind::ProcessingFailed,
            BenchError::Timeout(_) => FailureKind::Timeout,
            BenchError::Cancelled => FailureKind::Cancelled,
            _ => FailureKind::Other,
        }
    }
}
