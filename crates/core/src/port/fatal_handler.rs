// Fatal Error Handler Port
// Host policy for a worker loop that died on an unrecovered error

use crate::application::worker::constants::FATAL_EXIT_CODE;
use crate::error::WorkerError;
use tracing::error;

/// Fatal error handler trait
///
/// Implementations:
/// - LogFatalError: log and leave the process running (default)
/// - ExitProcess: terminate the process with a non-zero status
pub trait FatalErrorHandler: Send + Sync {
    /// Called exactly once when the work unit of `worker` fails
    ///
    /// Invoked after the worker is already marked as completed, so
    /// `is_failed()` is observable from inside the handler.
    fn on_fatal_error(&self, worker: &str, error: &WorkerError);
}

/// Logs the failure at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFatalError;

impl FatalErrorHandler for LogFatalError {
    fn on_fatal_error(&self, worker: &str, error: &WorkerError) {
        error!(worker = %worker, error = %error, "Worker terminated on unrecovered error");
    }
}

/// Terminates the hosting process
#[derive(Debug, Clone, Copy)]
pub struct ExitProcess {
    code: i32,
}

impl ExitProcess {
    pub fn new(code: i32) -> Self {
        Self { code }
    }

    pub fn code(&self) -> i32 {
        self.code
    }
}

impl Default for ExitProcess {
    fn default() -> Self {
        Self::new(FATAL_EXIT_CODE)
    }
}

impl FatalErrorHandler for ExitProcess {
    fn on_fatal_error(&self, worker: &str, error: &WorkerError) {
        error!(
            worker = %worker,
            error = %error,
            exit_code = self.code,
            "Worker terminated on unrecovered error, exiting process"
        );
        std::process::exit(self.code);
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    /// A single recorded fatal error
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct FatalCall {
        pub worker: String,
        pub message: String,
        pub is_panic: bool,
    }

    /// Records every invocation instead of acting on it
    #[derive(Debug, Default)]
    pub struct RecordingFatalHandler {
        calls: Mutex<Vec<FatalCall>>,
    }

    impl RecordingFatalHandler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<FatalCall> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }
    }

    impl FatalErrorHandler for RecordingFatalHandler {
        fn on_fatal_error(&self, worker: &str, error: &WorkerError) {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(FatalCall {
                    worker: worker.to_string(),
                    message: error.to_string(),
                    is_panic: matches!(error, WorkerError::Panicked(_)),
                });
        }
    }
}
