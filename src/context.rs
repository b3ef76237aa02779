use std::sync::{Arc, Mutex};

use tokio::{
    sync::{Notify, RwLock},
    task::JoinHandle,
};

use crate::{
    cli::RelayConfig,
    mpris::{art::ArtSource, metadata::Snapshot, proxy::MediaPlayer2PlayerProxy},
    server::registry::ClientRegistry,
};

/// Handle to the currently bound player.
///
/// Each establishment gets its own loss notifier, so a stale wakeup from a
/// previous connection can never tear down its successor.
#[derive(Clone)]
pub struct ActivePlayer {
    /// zbus proxy for the player interface.
    pub proxy: MediaPlayer2PlayerProxy<'static>,

    /// Signalled when any caller observes this connection failing.
    pub lost: Arc<Notify>,
}

/// Shared state for the whole bridge process.
///
/// Every component receives this context instead of reaching for globals.
/// At most one player is bound at a time and at most one snapshot exists;
/// both are replaced wholesale, never mutated in place. [`Self::shutdown`]
/// aborts the periodic tasks so no timer fires against a torn-down registry.
pub struct ServerContext {
    /// Runtime configuration.
    pub config: RelayConfig,

    /// Live set of WebSocket subscribers.
    pub registry: ClientRegistry,

    /// Cover-art supplier used by the translator.
    pub art: Box<dyn ArtSource>,

    /// Most recent snapshot, unset until the first successful translation
    /// and cleared on connection loss.
    current: RwLock<Option<Snapshot>>,

    /// Active player connection, if any.
    player: RwLock<Option<ActivePlayer>>,

    /// Handles of the periodic tasks, aborted on shutdown.
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ServerContext {
    /// Create a context with no player bound and no snapshot.
    pub fn new(config: RelayConfig, art: Box<dyn ArtSource>) -> Self {
        Self {
            config,
            registry: ClientRegistry::new(),
            art,
            current: RwLock::new(None),
            player: RwLock::new(None),
            task_handles: Mutex::new(Vec::new()),
        }
    }

    /// Current snapshot, if one is known.
    pub async fn snapshot(&self) -> Option<Snapshot> {
        self.current.read().await.clone()
    }

    /// JSON form of the current snapshot, `{}` when unset.
    pub async fn current_json(&self) -> String {
        match &*self.current.read().await {
            Some(snapshot) => snapshot.to_json(),
            None => "{}".to_string(),
        }
    }

    /// Replace the snapshot wholesale.
    pub async fn replace_snapshot(&self, snapshot: Snapshot) {
        *self.current.write().await = Some(snapshot);
    }

    /// Bind a freshly established player proxy and return its handle.
    pub async fn store_player(&self, proxy: MediaPlayer2PlayerProxy<'static>) -> ActivePlayer {
        let active = ActivePlayer {
            proxy,
            lost: Arc::new(Notify::new()),
        };
        *self.player.write().await = Some(active.clone());
        active
    }

    /// The bound player, if any.
    pub async fn active_player(&self) -> Option<ActivePlayer> {
        self.player.read().await.clone()
    }

    /// Discard the bound player and the snapshot, waking the watcher.
    ///
    /// Idempotent: only the call that actually removes a player signals the
    /// loss, so a connection is torn down exactly once.
    pub async fn lose_connection(&self) {
        let removed = self.player.write().await.take();
        if let Some(active) = removed {
            self.current.write().await.take();
            active.lost.notify_one();
        }
    }

    /// Track a spawned periodic task for shutdown.
    pub fn register_task(&self, handle: JoinHandle<()>) {
        if let Ok(mut handles) = self.task_handles.lock() {
            handles.push(handle);
        }
    }

    /// Abort every tracked task. Called once the serving socket closes.
    pub fn shutdown(&self) {
        if let Ok(mut handles) = self.task_handles.lock() {
            for handle in handles.drain(..) {
                handle.abort();
            }
        }
    }
}

impl Drop for ServerContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use crate::mpris::{art::FileArtSource, metadata::TrackMetadata, testing};

    use super::*;

    fn test_config() -> RelayConfig {
        RelayConfig {
            player: "test".to_string(),
            port: 0,
            static_dir: PathBuf::from("public"),
            plain_pong: false,
            liveness_period: Duration::from_secs(30),
            poll_period: Duration::from_millis(100),
            reconnect_delay: Duration::from_secs(10),
        }
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
    async fn current_json_is_empty_object_until_seeded() {
        let ctx = ServerContext::new(test_config(), Box::new(FileArtSource));

        assert_eq!(ctx.current_json().await, "{}");

        ctx.replace_snapshot(test_snapshot()).await;

        let json: serde_json::Value = serde_json::from_str(&ctx.current_json().await).unwrap();
        assert_eq!(json["position"], 42);
    }

    #[tokio::test]
    async fn losing_the_bound_connection_clears_state_and_signals_once() {
        let ctx = ServerContext::new(test_config(), Box::new(FileArtSource));
        let (proxy, _connection) = testing::vanished_player_proxy().await;

        let active = ctx.store_player(proxy).await;
        ctx.replace_snapshot(test_snapshot()).await;

        ctx.lose_connection().await;

        assert!(ctx.snapshot().await.is_none());
        assert!(ctx.active_player().await.is_none());

        // The permit is stored even though nobody was waiting yet.
        tokio::time::timeout(Duration::from_secs(1), active.lost.notified())
            .await
            .unwrap();

        // A second call has nothing left to tear down and must not signal
        // the already-lost player again.
        ctx.lose_connection().await;
        let again = tokio::time::timeout(Duration::from_millis(50), active.lost.notified()).await;
        assert!(again.is_err());
    }

    #[tokio::test]
    async fn losing_a_connection_without_one_bound_is_a_no_op() {
        let ctx = ServerContext::new(test_config(), Box::new(FileArtSource));

        ctx.replace_snapshot(test_snapshot()).await;
        ctx.lose_connection().await;

        // No player was bound, so the snapshot must be untouched.
        assert!(ctx.snapshot().await.is_some());
    }
}
