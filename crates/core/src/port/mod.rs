// Port Layer - Interfaces for host collaborators

pub mod fatal_handler;

// Re-exports
pub use fatal_handler::{ExitProcess, FatalErrorHandler, LogFatalError};
