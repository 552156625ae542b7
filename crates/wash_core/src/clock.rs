use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

/// Scheduling capability the core suspends on. Production code rides the
/// tokio timer wheel; tests run the same impl under a paused runtime so
/// virtual time advances deterministically.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
