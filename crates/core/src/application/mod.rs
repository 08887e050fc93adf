// Application Layer - Worker lifecycle

pub mod worker;

// Re-exports
pub use worker::{ShutdownableWorker, WorkerHandle};
