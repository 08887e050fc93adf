// Work Unit - the operation repeated by the worker loop

use super::handle::WorkerHandle;
use crate::error::BoxError;
use async_trait::async_trait;
use std::future::Future;

/// Work unit trait
///
/// Invoked repeatedly until shutdown is requested or it fails. Any error
/// (or panic) is fatal to the loop; retrying is the implementation's job.
#[async_trait]
pub trait WorkUnit: Send + Sync + 'static {
    async fn do_work(&self, worker: &WorkerHandle) -> Result<(), BoxError>;
}

/// Adapter turning a closure into a work unit (see `work_fn`)
pub struct FnWork<F> {
    f: F,
}

/// Build a work unit from a closure returning a future
///
/// # Example
/// ```text
/// let work = work_fn(|worker| async move {
///     poll_once().await?;
///     worker.pause(Duration::from_secs(1)).await;
///     Ok(())
/// });
/// ```
pub fn work_fn<F, Fut>(f: F) -> FnWork<F>
where
    F: Fn(WorkerHandle) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    FnWork { f }
}

#[async_trait]
impl<F, Fut> WorkUnit for FnWork<F>
where
    F: Fn(WorkerHandle) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
{
    async fn do_work(&self, worker: &WorkerHandle) -> Result<(), BoxError> {
        (self.f)(worker.clone()).await
    }
}
