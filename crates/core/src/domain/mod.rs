// Domain Layer - Signals and lifecycle state

pub mod latch;
pub mod status;

pub use latch::Latch;
pub use status::WorkerStatus;
