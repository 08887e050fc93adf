// Worker constants (ADR: No magic values)

/// Exit status used by `ExitProcess::default()` (what `exit(-1)` yields on Unix)
pub const FATAL_EXIT_CODE: i32 = 255;

/// Workers cancel an in-flight work unit on shutdown unless configured otherwise
pub const DEFAULT_INTERRUPTIBLE: bool = true;

/// Message for `await_shutdown()` called before `initiate_shutdown()`
pub const AWAIT_BEFORE_INITIATE: &str = "initiate_shutdown() was not called before await_shutdown()";
