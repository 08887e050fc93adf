// Central Error Type for the Worker Primitive

use thiserror::Error;

/// Error type returned by a work unit
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Worker-level error type
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Illegal state: {0}")]
    IllegalState(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Worker already started: {0}")]
    AlreadyStarted(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Work unit failed: {0}")]
    WorkFailed(#[source] BoxError),

    #[error("Work unit panicked: {0}")]
    Panicked(String),
}

impl WorkerError {
    /// True for errors raised by the work unit itself (returned error or panic)
    pub fn is_work_failure(&self) -> bool {
        matches!(self, WorkerError::WorkFailed(_) | WorkerError::Panicked(_))
    }
}

/// Result type alias using WorkerError
pub type Result<T> = std::result::Result<T, WorkerError>;
