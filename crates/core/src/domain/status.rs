// Worker lifecycle status (derived, never stored)

use serde::Serialize;
use std::fmt;

/// Snapshot of a worker's lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    /// Constructed, not started, no shutdown requested
    Idle,
    /// Background loop is invoking the work unit
    Running,
    /// Shutdown requested, loop has not finished yet
    ShuttingDown,
    /// Stopped after a requested shutdown (or requested before it ever started)
    Stopped,
    /// Loop terminated on its own because the work unit failed
    Failed,
}

impl WorkerStatus {
    /// Derive status from the worker's flags
    pub fn derive(started: bool, shutdown_requested: bool, shutdown_completed: bool) -> Self {
        match (shutdown_requested, shutdown_completed) {
            (false, true) => WorkerStatus::Failed,
            (true, true) => WorkerStatus::Stopped,
            (true, false) if !started => WorkerStatus::Stopped,
            (true, false) => WorkerStatus::ShuttingDown,
            (false, false) if started => WorkerStatus::Running,
            (false, false) => WorkerStatus::Idle,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerStatus::Idle => "idle",
            WorkerStatus::Running => "running",
            WorkerStatus::ShuttingDown => "shutting_down",
            WorkerStatus::Stopped => "stopped",
            WorkerStatus::Failed => "failed",
        }
    }

    /// True once the status can no longer change
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerStatus::Stopped | WorkerStatus::Failed)
    }
}

impl fmt::Display for WorkerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
