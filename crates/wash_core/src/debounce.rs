use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::clock::{Clock, TokioClock};

/// Collapses bursts of calls into one trailing invocation of the wrapped
/// action. At most one timer is pending per wrapper; every call replaces
/// it, so the latest arguments win. Fire-and-forget: callers get nothing
/// back, and a panicking action unwinds only its own timer task.
pub struct Debouncer<T> {
    delay: Duration,
    clock: Arc<dyn Clock>,
    action: Arc<dyn Fn(T) + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, action: impl Fn(T) + Send + Sync + 'static) -> Self {
        Self::with_clock(delay, Arc::new(TokioClock), action)
    }

    pub fn with_clock(
        delay: Duration,
        clock: Arc<dyn Clock>,
        action: impl Fn(T) + Send + Sync + 'static,
    ) -> Self {
        Self {
            delay,
            clock,
            action: Arc::new(action),
            pending: Mutex::new(None),
        }
    }

    /// Arm a fresh timer carrying `value`, cancelling any timer still
    /// pending. Must be called from within a tokio runtime.
    pub fn call(&self, value: T) {
        let clock = Arc::clone(&self.clock);
        let action = Arc::clone(&self.action);
        let delay = self.delay;
        let task = tokio::spawn(async move {
            clock.sleep(delay).await;
            action(value);
        });

        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.replace(task) {
                previous.abort();
            }
        }
    }

    /// Whether a timer is armed and has not fired yet.
    pub fn is_pending(&self) -> bool {
        match self.pending.lock() {
            Ok(pending) => pending.as_ref().is_some_and(|task| !task.is_finished()),
            Err(_) => false,
        }
    }
}

impl<T> Drop for Debouncer<T> {
    // The pending slot is owned by exactly one wrapper; no timer outlives it.
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(task) = pending.take() {
                task.abort();
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/debounce_tests.rs"]
mod tests;
