use std::time::Duration;

use axum::extract::ws::Message;
use bytes::Bytes;
use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::info;

use super::registry::ClientRegistry;

/// Evicts subscribers that stop answering liveness probes.
///
/// Each cycle, a client whose flag is still clear is terminated; otherwise
/// the flag is cleared and a transport ping is sent. Pong handling sets the
/// flag again, so an unresponsive client survives at most two cycles.
pub struct LivenessMonitor {
    registry: ClientRegistry,
    period: Duration,
}

impl LivenessMonitor {
    /// Create a monitor over the given registry.
    pub fn new(registry: ClientRegistry, period: Duration) -> Self {
        Self { registry, period }
    }

    /// Spawn the probe task. The handle must be aborted on shutdown so the
    /// timer never fires against a torn-down registry.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; skip it so freshly
            // connected clients get a full cycle before their first probe.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        })
    }

    async fn sweep(&self) {
        for (id, alive) in self.registry.liveness_snapshot().await {
            if alive {
                self.registry.clear_alive(id).await;
                self.registry.send_to(id, Message::Ping(Bytes::new())).await;
            } else {
                info!("Client {id} missed its liveness probe, evicting");
                self.registry.evict(id).await;
            }
        }
    }
}
