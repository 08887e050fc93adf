// One-shot signal (set once, observed from any thread)

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;

/// One-shot signal
///
/// Starts unset, transitions to set at most once and never resets.
/// `is_set` is a plain atomic load; waiters are woken through a `Notify`.
#[derive(Debug, Default)]
pub struct Latch {
    set: AtomicBool,
    notify: Notify,
}

impl Latch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the latch was set (lock-free)
    pub fn is_set(&self) -> bool {
        self.set.load(Ordering::Acquire)
    }

    /// Set the latch and wake every waiter
    ///
    /// Returns true only for the call that actually set it.
    pub fn count_down(&self) -> bool {
        let first = !self.set.swap(true, Ordering::AcqRel);
        if first {
            self.notify.notify_waiters();
        }
        first
    }

    /// Wait until the latch is set
    pub async fn wait(&self) {
        if self.is_set() {
            return;
        }

        // Register before re-checking so a concurrent count_down cannot be missed
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.is_set() {
            return;
        }
        notified.await;
    }

    /// Wait until the latch is set or `timeout` elapses
    ///
    /// Returns true if the latch was set in time.
    pub async fn wait_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait()).await.is_ok()
    }
}
