// Panic isolation for the worker loop (ADR-002)
use crate::error::{BoxError, WorkerError};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::error;

/// Extract a readable message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Run one work unit invocation with panic isolation
///
/// A returned error becomes `WorkerError::WorkFailed`, a panic becomes
/// `WorkerError::Panicked`. Either way the caller gets a value back instead
/// of the panic unwinding through the worker loop.
///
/// # Example
/// ```text
/// let result = execute_guarded(async { panic!("test panic") }).await;
/// assert!(matches!(result, Err(WorkerError::Panicked(_))));
/// ```
pub async fn execute_guarded<F>(future: F) -> Result<(), WorkerError>
where
    F: Future<Output = Result<(), BoxError>>,
{
    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(WorkerError::WorkFailed(e)),
        Err(payload) => {
            let panic_msg = panic_message(payload.as_ref());
            error!(panic_msg = %panic_msg, "Work unit panicked");
            Err(WorkerError::Panicked(panic_msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_success_passes_through() {
        let result = execute_guarded(async { Ok(()) }).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_error_becomes_work_failed() {
        let result = execute_guarded(async { Err::<(), BoxError>("broken pipe".into()) }).await;

        match result {
            Err(WorkerError::WorkFailed(e)) => assert_eq!(e.to_string(), "broken pipe"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    async fn panics_with_str() -> Result<(), BoxError> {
        panic!("static message")
    }

    async fn panics_with_string(id: u32) -> Result<(), BoxError> {
        panic!("formatted {}", id)
    }

    #[tokio::test]
    async fn test_panic_str_is_caught() {
        let result = execute_guarded(panics_with_str()).await;

        match result {
            Err(WorkerError::Panicked(msg)) => assert_eq!(msg, "static message"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_panic_string_is_caught() {
        let result = execute_guarded(panics_with_string(7)).await;

        match result {
            Err(WorkerError::Panicked(msg)) => assert_eq!(msg, "formatted 7"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_payload() {
        let payload: Box<dyn Any + Send> = Box::new(42u32);
        assert_eq!(panic_message(payload.as_ref()), "Unknown panic");
    }
}
