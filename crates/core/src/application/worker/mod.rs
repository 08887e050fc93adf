// Worker - Shutdownable background loop

pub mod constants;
mod handle;
mod panic_guard;
mod work_unit;


use constants::*;
pub use handle::WorkerHandle;
pub use panic_guard::{execute_guarded, panic_message};
pub use work_unit::{work_fn, FnWork, WorkUnit};

use crate::domain::WorkerStatus;
use crate::error::{Result, WorkerError};
use crate::port::{FatalErrorHandler, LogFatalError};
use handle::WorkerShared;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};

/// Background worker that repeats a work unit until shut down or failed
///
/// Single-use: once stopped (or failed) it never runs again. Status queries
/// stay valid forever and are safe from any thread, before or after `start()`.
///
/// # Example
/// ```text
/// let worker = ShutdownableWorker::new("poller", work_fn(|worker| async move {
///     poll_once().await?;
///     worker.pause(Duration::from_secs(1)).await;
///     Ok(())
/// }));
/// worker.start()?;
/// // ...
/// worker.shutdown().await?;
/// ```
pub struct ShutdownableWorker {
    shared: Arc<WorkerShared>,
    work: Arc<dyn WorkUnit>,
    fatal_handler: Arc<dyn FatalErrorHandler>,
    started: AtomicBool,
}

impl ShutdownableWorker {
    /// Create an idle, interruptible worker
    pub fn new(name: impl Into<String>, work: impl WorkUnit) -> Self {
        Self::new_with_interruptible(name, DEFAULT_INTERRUPTIBLE, work)
    }

    /// Create an idle worker, choosing whether shutdown cancels an in-flight
    /// work unit
    ///
    /// Non-interruptible workers let the current invocation return on its
    /// own; the work unit should use `pause()` or poll `is_running()`.
    pub fn new_with_interruptible(
        name: impl Into<String>,
        interruptible: bool,
        work: impl WorkUnit,
    ) -> Self {
        Self {
            shared: Arc::new(WorkerShared::new(name.into(), interruptible)),
            work: Arc::new(work),
            fatal_handler: Arc::new(LogFatalError),
            started: AtomicBool::new(false),
        }
    }

    /// Replace the fatal error handler (default: `LogFatalError`)
    pub fn with_fatal_handler(mut self, handler: Arc<dyn FatalErrorHandler>) -> Self {
        self.fatal_handler = handler;
        self
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn is_interruptible(&self) -> bool {
        self.shared.interruptible
    }

    /// Spawn the background loop on the current tokio runtime
    ///
    /// Call at most once. A second call returns `WorkerError::AlreadyStarted`,
    /// even from outside a runtime. A call outside a runtime on a worker that
    /// was never started returns `WorkerError::Runtime` and leaves it startable.
    pub fn start(&self) -> Result<()> {
        if self.is_started() {
            return Err(WorkerError::AlreadyStarted(self.shared.name.clone()));
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| WorkerError::Runtime(e.to_string()))?;

        if self.started.swap(true, Ordering::AcqRel) {
            return Err(WorkerError::AlreadyStarted(self.shared.name.clone()));
        }

        // Created before spawning: dropping an unpolled task still completes
        let completion = CompletionGuard::new(Arc::clone(&self.shared));
        let span = info_span!("worker", name = %self.shared.name);

        runtime.spawn(
            run_loop(
                Arc::clone(&self.shared),
                Arc::clone(&self.work),
                Arc::clone(&self.fatal_handler),
                completion,
            )
            .instrument(span),
        );
        Ok(())
    }

    /// Request shutdown
    ///
    /// Returns true for the caller that actually requested it, false if
    /// shutdown was already requested or the worker already terminated.
    pub fn initiate_shutdown(&self) -> bool {
        let _guard = self
            .shared
            .shutdown_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.shared.is_running() {
            info!(worker = %self.shared.name, "Shutting down");
            self.shared.shutdown_requested.count_down();
            if self.shared.interruptible {
                self.shared.interrupt.notify_one();
            }
            true
        } else {
            false
        }
    }

    /// Wait until the loop has finished
    ///
    /// Fails with `WorkerError::IllegalState` if `initiate_shutdown()` was not
    /// called first, unless the loop already ended on its own (failure).
    /// Returns immediately if the worker was never started.
    pub async fn await_shutdown(&self) -> Result<()> {
        self.await_shutdown_until(std::future::pending::<()>()).await
    }

    /// Like `await_shutdown`, but gives up with `WorkerError::Cancelled`
    /// as soon as `interrupt` resolves
    ///
    /// Only this caller is cancelled; other waiters keep waiting.
    pub async fn await_shutdown_until<F>(&self, interrupt: F) -> Result<()>
    where
        F: Future,
    {
        // A failed worker is already done even though nobody requested it
        if !self.is_shutdown_initiated() && !self.is_shutdown_completed() {
            return Err(WorkerError::IllegalState(AWAIT_BEFORE_INITIATE.to_string()));
        }

        if self.is_started() {
            tokio::select! {
                biased;
                _ = self.shared.shutdown_completed.wait() => {}
                _ = interrupt => {
                    return Err(WorkerError::Cancelled(format!(
                        "wait for shutdown of worker '{}' was interrupted",
                        self.shared.name
                    )));
                }
            }
        }

        info!(worker = %self.shared.name, "Shutdown completed");
        Ok(())
    }

    /// `initiate_shutdown()` followed by `await_shutdown()`
    pub async fn shutdown(&self) -> Result<()> {
        self.initiate_shutdown();
        self.await_shutdown().await
    }

    /// `initiate_shutdown()` followed by `await_shutdown_until(interrupt)`
    pub async fn shutdown_until<F>(&self, interrupt: F) -> Result<()>
    where
        F: Future,
    {
        self.initiate_shutdown();
        self.await_shutdown_until(interrupt).await
    }

    /// Wait until shutdown is requested, the loop terminates, or `timeout` elapses
    pub async fn pause(&self, timeout: Duration) {
        self.shared.pause(timeout).await
    }

    /// A handle onto this worker's shutdown state
    pub fn handle(&self) -> WorkerHandle {
        WorkerHandle::new(Arc::clone(&self.shared))
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn is_shutdown_initiated(&self) -> bool {
        self.shared.shutdown_requested.is_set()
    }

    pub fn is_shutdown_completed(&self) -> bool {
        self.shared.shutdown_completed.is_set()
    }

    /// True until shutdown is requested or the loop terminates
    pub fn is_running(&self) -> bool {
        self.shared.is_running()
    }

    /// True if the loop terminated on its own because the work unit failed
    pub fn is_failed(&self) -> bool {
        self.is_shutdown_completed() && !self.is_shutdown_initiated()
    }

    pub fn status(&self) -> WorkerStatus {
        WorkerStatus::derive(
            self.is_started(),
            self.is_shutdown_initiated(),
            self.is_shutdown_completed(),
        )
    }
}

impl std::fmt::Debug for ShutdownableWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownableWorker")
            .field("name", &self.shared.name)
            .field("interruptible", &self.shared.interruptible)
            .field("status", &self.status())
            .finish()
    }
}

/// Sets `shutdown_completed` when dropped, whatever way the loop exits
struct CompletionGuard {
    shared: Arc<WorkerShared>,
}

impl CompletionGuard {
    fn new(shared: Arc<WorkerShared>) -> Self {
        Self { shared }
    }

    fn complete(self) {
        // Drop does the work
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.shared.shutdown_completed.count_down();
    }
}

/// Outcome of a single work unit invocation
enum Iteration {
    Completed,
    Interrupted,
    Failed(WorkerError),
}

async fn run_once(shared: &WorkerShared, work: &dyn WorkUnit, handle: &WorkerHandle) -> Iteration {
    let guarded = execute_guarded(work.do_work(handle));

    let result = if shared.interruptible {
        tokio::select! {
            biased;
            _ = shared.interrupt.notified() => return Iteration::Interrupted,
            result = guarded => result,
        }
    } else {
        guarded.await
    };

    match result {
        Ok(()) => Iteration::Completed,
        Err(e) => Iteration::Failed(e),
    }
}

/// Background loop body
async fn run_loop(
    shared: Arc<WorkerShared>,
    work: Arc<dyn WorkUnit>,
    fatal_handler: Arc<dyn FatalErrorHandler>,
    completion: CompletionGuard,
) {
    info!("Starting");
    let handle = WorkerHandle::new(Arc::clone(&shared));

    while shared.is_running() {
        match run_once(&shared, work.as_ref(), &handle).await {
            Iteration::Completed => {}
            Iteration::Interrupted => {
                debug!("Work unit interrupted by shutdown request");
                break;
            }
            Iteration::Failed(e) => {
                // Same lock as initiate_shutdown: a concurrent request either
                // lands before this check or observes the loop as completed
                let requested = {
                    let _guard = shared
                        .shutdown_lock
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner);
                    let requested = shared.shutdown_requested.is_set();
                    completion.complete();
                    requested
                };
                if requested {
                    warn!(error = %e, "Work unit failed after shutdown was requested");
                } else {
                    fatal_handler.on_fatal_error(&shared.name, &e);
                }
                info!("Stopped");
                return;
            }
        }
    }

    completion.complete();
    info!("Stopped");
}
