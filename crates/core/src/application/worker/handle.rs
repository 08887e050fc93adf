// Worker Handle - shared shutdown state, as seen from inside the work unit

use crate::domain::Latch;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::trace;

/// State shared between the owner and the background loop
#[derive(Debug)]
pub(crate) struct WorkerShared {
    pub(crate) name: String,
    pub(crate) interruptible: bool,
    pub(crate) shutdown_requested: Latch,
    pub(crate) shutdown_completed: Latch,
    /// Wakes the loop out of an in-flight work unit (interruptible workers only)
    pub(crate) interrupt: Notify,
    /// Serializes initiate_shutdown's check-and-set
    pub(crate) shutdown_lock: Mutex<()>,
}

impl WorkerShared {
    pub(crate) fn new(name: String, interruptible: bool) -> Self {
        Self {
            name,
            interruptible,
            shutdown_requested: Latch::new(),
            shutdown_completed: Latch::new(),
            interrupt: Notify::new(),
            shutdown_lock: Mutex::new(()),
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.shutdown_requested.is_set() && !self.shutdown_completed.is_set()
    }

    /// Ends early on a shutdown request or on the loop terminating by itself
    pub(crate) async fn pause(&self, timeout: Duration) {
        tokio::select! {
            _ = self.shutdown_requested.wait() => {
                trace!(worker = %self.name, "Shutdown requested during pause");
            }
            _ = self.shutdown_completed.wait() => {
                trace!(worker = %self.name, "Worker terminated during pause");
            }
            _ = tokio::time::sleep(timeout) => {}
        }
    }
}

/// Handle passed to the work unit on every invocation
///
/// Cheap to clone; lets the work unit poll for shutdown or sleep in a way
/// that ends early once shutdown is requested.
#[derive(Clone, Debug)]
pub struct WorkerHandle {
    shared: Arc<WorkerShared>,
}

impl WorkerHandle {
    pub(crate) fn new(shared: Arc<WorkerShared>) -> Self {
        Self { shared }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Check if the worker should keep going
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// Check if shutdown was requested
    pub fn is_shutdown_initiated(&self) -> bool {
        self.shared.shutdown_requested.is_set()
    }

    /// Wait until shutdown is requested, the worker terminates, or `timeout` elapses
    ///
    /// Returns normally in both cases; re-check `is_running()` afterwards.
    pub async fn pause(&self, timeout: Duration) {
        self.shared.pause(timeout).await
    }
}
