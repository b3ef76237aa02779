use std::{fmt::Display, future::Future, time::Duration};

use tokio::time::sleep;
use tracing::warn;

/// Retries player establishment with a fixed delay until it succeeds.
///
/// The supervisor never gives up and never watches connection health itself;
/// the watcher and poller call back into it after they observe a failure.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectSupervisor {
    delay: Duration,
}

impl ReconnectSupervisor {
    /// Create a supervisor with a fixed retry delay.
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Run `attempt` until it succeeds, sleeping the fixed delay after each
    /// failure.
    pub async fn acquire<T, E, F, Fut>(&self, mut attempt: F) -> T
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        loop {
            match attempt().await {
                Ok(connected) => return connected,
                Err(e) => {
                    warn!("Player connection attempt failed, retrying in {:?}: {e}", self.delay);
                    sleep(self.delay).await;
                }
            }
        }
    }
}
