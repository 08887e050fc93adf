// Shutdownable Core - Worker Primitive & Ports
// NO host wiring (ADR-001: Hexagonal Architecture)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::worker::{work_fn, ShutdownableWorker, WorkUnit, WorkerHandle};
pub use domain::{Latch, WorkerStatus};
pub use error::{BoxError, Result, WorkerError};
pub use port::{ExitProcess, FatalErrorHandler, LogFatalError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
