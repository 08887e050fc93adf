//! Illustrative server hosting one shutdownable worker

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use shutdownable_core::{work_fn, BoxError, FatalErrorHandler, ShutdownableWorker, WorkerStatus};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// A long-running service with an explicit lifecycle
#[async_trait]
pub trait Server: Send + Sync {
    fn start(&self) -> Result<()>;

    async fn shutdown(&self) -> Result<()>;
}

/// Server whose only job is logging that it is doing work
pub struct SimpleServer {
    name: String,
    worker: ShutdownableWorker,
    iterations: Arc<AtomicU64>,
}

impl SimpleServer {
    pub fn new(config: &Config, fatal_handler: Arc<dyn FatalErrorHandler>) -> Self {
        let iterations = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&iterations);
        let interval = config.work_interval;

        let work = work_fn(move |worker| {
            let counter = Arc::clone(&counter);
            async move {
                let iteration = counter.fetch_add(1, Ordering::Relaxed) + 1;
                info!(iteration, "Doing some work for you.");
                worker.pause(interval).await;
                Ok::<(), BoxError>(())
            }
        });

        let worker = ShutdownableWorker::new_with_interruptible(
            config.server_name.clone(),
            config.interruptible,
            work,
        )
        .with_fatal_handler(fatal_handler);

        Self {
            name: config.server_name.clone(),
            worker,
            iterations,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of completed or in-flight work iterations
    pub fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> WorkerStatus {
        self.worker.status()
    }

    /// Shut down, giving up on the wait as soon as `interrupt` resolves
    pub async fn shutdown_until<F>(&self, interrupt: F) -> Result<()>
    where
        F: Future + Send,
    {
        info!("{} is shutting down", self.name);
        self.worker
            .shutdown_until(interrupt)
            .await
            .with_context(|| format!("{} did not shut down cleanly", self.name))?;
        info!("{} is down now", self.name);
        Ok(())
    }
}

#[async_trait]
impl Server for SimpleServer {
    fn start(&self) -> Result<()> {
        info!("{} is starting up", self.name);
        self.worker
            .start()
            .with_context(|| format!("{} failed to start", self.name))?;
        info!("{} has started up", self.name);
        Ok(())
    }

    async fn shutdown(&self) -> Result<()> {
        self.shutdown_until(std::future::pending::<()>()).await
    }
}
