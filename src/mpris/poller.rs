use std::sync::Arc;

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::warn;

use crate::context::ServerContext;

use super::metadata::PositionSample;

/// Polls playback position at a fixed cadence and broadcasts it.
///
/// Players push metadata changes but not position, so the poller supplements
/// the change notifications. A failed read is the primary signal that the
/// player went away: the connection and snapshot are cleared and the watcher
/// is woken to reconnect.
pub struct PositionPoller {
    ctx: Arc<ServerContext>,
}

impl PositionPoller {
    /// Create a poller over the shared context.
    pub fn new(ctx: Arc<ServerContext>) -> Self {
        Self { ctx }
    }

    /// Spawn the polling task. The handle must be aborted on shutdown.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = time::interval(self.ctx.config.poll_period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                self.poll_once().await;
            }
        })
    }

    async fn poll_once(&self) {
        let Some(active) = self.ctx.active_player().await else {
            return;
        };

        match active.proxy.position().await {
            Ok(position_us) => {
                let sample = PositionSample::from_micros(position_us);
                self.ctx.registry.broadcast(&sample.to_json(), None).await;
            }
            Err(e) => {
                warn!("Position poll failed, treating the player as gone: {e}");
                self.ctx.lose_connection().await;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use crate::{
        cli::RelayConfig,
        mpris::{
            art::FileArtSource,
            metadata::{Snapshot, TrackMetadata},
            testing,
        },
    };

    use super::*;

    fn test_context() -> Arc<ServerContext> {
        Arc::new(ServerContext::new(
            RelayConfig {
                player: "test".to_string(),
                port: 0,
                static_dir: PathBuf::from("public"),
                plain_pong: false,
                liveness_period: Duration::from_secs(30),
                poll_period: Duration::from_millis(100),
                reconnect_delay: Duration::from_secs(10),
            },
            Box::new(FileArtSource),
        ))
    }

    fn test_snapshot() -> Snapshot {
        Snapshot {
            metadata: TrackMetadata {
                album_art: None,
                length: 180,
                trackid: "/track/1".to_string(),
                album: "Album".to_string(),
                artist: "Artist".to_string(),
                title: "Title".to_string(),
            },
            position: 42,
        }
    }

    #[tokio::test]
    async fn polling_without_a_player_is_a_no_op() {
        let ctx = test_context();
        ctx.replace_snapshot(test_snapshot()).await;

        PositionPoller::new(ctx.clone()).poll_once().await;

        assert!(ctx.snapshot().await.is_some());
    }

    #[tokio::test]
    async fn a_failed_poll_unbinds_the_player_and_clears_the_snapshot() {
        let ctx = test_context();
        let (proxy, _connection) = testing::vanished_player_proxy().await;
        let active = ctx.store_player(proxy).await;
        ctx.replace_snapshot(test_snapshot()).await;

        PositionPoller::new(ctx.clone()).poll_once().await;

        assert!(ctx.active_player().await.is_none());
        assert!(ctx.snapshot().await.is_none());

        // The watcher must have been woken to reconnect.
        tokio::time::timeout(Duration::from_secs(1), active.lost.notified())
            .await
            .unwrap();
    }
}
