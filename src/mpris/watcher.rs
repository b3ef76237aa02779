use std::{collections::HashMap, sync::Arc};

use futures::StreamExt;
use tracing::{debug, info, instrument, warn};
use zbus::{Connection, fdo, names::BusName, proxy::PropertyChanged, zvariant::OwnedValue};

use crate::context::{ActivePlayer, ServerContext};

use super::{
    error::MprisError,
    metadata,
    proxy::MediaPlayer2PlayerProxy,
    reconnect::ReconnectSupervisor,
};

/// Connection lifecycle of the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// No player connection held.
    Disconnected,
    /// Establishment in progress.
    Connecting,
    /// Bound and receiving change notifications.
    Subscribed,
}

/// Owns the connection to the player and keeps the shared snapshot current.
///
/// Cycles `Disconnected -> Connecting -> Subscribed -> Disconnected`
/// forever. While subscribed, each `Metadata` change notification triggers a
/// full re-read, translation, snapshot replacement and broadcast. A bad
/// bundle is dropped without leaving the subscription; a failed player call
/// tears the connection down and hands control back to the supervisor.
pub struct PlaybackWatcher {
    ctx: Arc<ServerContext>,
    connection: Connection,
    state: WatcherState,
}

impl PlaybackWatcher {
    /// Create a watcher over an established session bus connection.
    pub fn new(ctx: Arc<ServerContext>, connection: Connection) -> Self {
        Self {
            ctx,
            connection,
            state: WatcherState::Disconnected,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Drive the watcher forever: establish, subscribe, tear down, repeat.
    pub async fn run(mut self) {
        let supervisor = ReconnectSupervisor::new(self.ctx.config.reconnect_delay);

        loop {
            self.state = WatcherState::Connecting;
            let connection = self.connection.clone();
            let bus_name = self.ctx.config.bus_name();
            let proxy = supervisor
                .acquire(|| establish(connection.clone(), bus_name.clone()))
                .await;
            info!(player = %self.ctx.config.player, "Bound to player");

            let active = self.ctx.store_player(proxy).await;
            self.seed_snapshot(&active).await;

            self.state = WatcherState::Subscribed;
            self.subscribed(&active).await;

            self.state = WatcherState::Disconnected;
            self.ctx.lose_connection().await;
            info!("Player connection lost");
        }
    }

    /// Initial read to seed the snapshot. Nothing playing yet is not fatal;
    /// the subscription proceeds with the snapshot unset. A failed player
    /// call here is louder than an untranslatable bundle, since it usually
    /// means the connection is already bad.
    async fn seed_snapshot(&self, active: &ActivePlayer) {
        match self.read_snapshot(&active.proxy).await {
            Ok(snapshot) => self.ctx.replace_snapshot(snapshot).await,
            Err(MprisError::Translate(e)) => debug!("No initial playback state: {e}"),
            Err(e) => warn!("Initial state read failed: {e}"),
        }
    }

    async fn read_snapshot(
        &self,
        proxy: &MediaPlayer2PlayerProxy<'static>,
    ) -> Result<metadata::Snapshot, MprisError> {
        let raw = proxy.metadata().await?;
        let position_us = proxy.position().await?;
        Ok(metadata::translate(&raw, position_us, self.ctx.art.as_ref())?)
    }

    async fn subscribed(&self, active: &ActivePlayer) {
        let mut metadata_changes = active.proxy.receive_metadata_changed().await;

        loop {
            tokio::select! {
                signal = metadata_changes.next() => match signal {
                    Some(signal) => {
                        if let Err(e) = self.handle_metadata_change(active, signal).await {
                            match e {
                                MprisError::Translate(e) => {
                                    warn!("Dropping untranslatable metadata update: {e}");
                                }
                                e => {
                                    warn!("Player call failed, tearing down connection: {e}");
                                    return;
                                }
                            }
                        }
                    }
                    None => {
                        debug!("Metadata change stream ended");
                        return;
                    }
                },
                () = active.lost.notified() => return,
            }
        }
    }

    async fn handle_metadata_change(
        &self,
        active: &ActivePlayer,
        signal: PropertyChanged<'_, HashMap<String, OwnedValue>>,
    ) -> Result<(), MprisError> {
        let raw = signal.get().await?;
        let position_us = active.proxy.position().await?;
        let snapshot = metadata::translate(&raw, position_us, self.ctx.art.as_ref())?;

        let payload = snapshot.to_json();
        self.ctx.replace_snapshot(snapshot).await;
        self.ctx.registry.broadcast(&payload, None).await;
        Ok(())
    }
}

/// Locate the player on the bus and build its proxy.
///
/// Checking name ownership up front turns "player not running" into a clean
/// failure instead of a proxy that errors on first use.
#[instrument(skip(connection))]
async fn establish(
    connection: Connection,
    bus_name: String,
) -> Result<MediaPlayer2PlayerProxy<'static>, MprisError> {
    let dbus_proxy = fdo::DBusProxy::new(&connection).await?;

    let name = BusName::try_from(bus_name.as_str()).map_err(zbus::Error::from)?;
    let owned = dbus_proxy
        .name_has_owner(name)
        .await
        .map_err(zbus::Error::from)?;
    if !owned {
        return Err(MprisError::PlayerNotFound(bus_name));
    }

    let proxy = MediaPlayer2PlayerProxy::builder(&connection)
        .destination(bus_name)?
        .build()
        .await?;
    Ok(proxy)
}
