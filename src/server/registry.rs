use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use axum::extract::ws::Message;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info, warn};

/// Unique identity of one subscriber connection.
pub type ClientId = u64;

/// Outbound queue of one subscriber connection. The session task on the
/// other end forwards queued messages to the socket.
pub type ClientSender = mpsc::UnboundedSender<Message>;

#[derive(Debug)]
struct ClientSlot {
    tx: ClientSender,
    alive: bool,
}

/// Tracks the live set of subscriber connections.
///
/// Owns every client slot exclusively: a slot is inserted on connect and
/// removed on disconnect or eviction, so the registry never holds a closed
/// client. One subscriber failing to accept a payload never aborts delivery
/// to the rest.
#[derive(Clone)]
pub struct ClientRegistry {
    clients: Arc<RwLock<HashMap<ClientId, ClientSlot>>>,
    next_id: Arc<AtomicU64>,
}

impl ClientRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            clients: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Insert a new client and return its identity. Fresh clients count as
    /// alive so the first probe cycle cannot evict them.
    pub async fn add(&self, tx: ClientSender) -> ClientId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut clients = self.clients.write().await;
        clients.insert(id, ClientSlot { tx, alive: true });
        info!("Client {id} added. Total clients: {}", clients.len());
        id
    }

    /// Remove a client. No-op if it is already gone.
    pub async fn remove(&self, id: ClientId) {
        let mut clients = self.clients.write().await;
        if clients.remove(&id).is_some() {
            info!("Client {id} removed. Total clients: {}", clients.len());
        }
    }

    /// Number of connected clients.
    pub async fn count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Send `payload` to every client except `exclude`, in no particular
    /// order.
    ///
    /// Membership is snapshotted before iterating, so a removal triggered by
    /// a failed send cannot invalidate the iteration. Clients whose queue is
    /// gone are removed after the rest have been served.
    pub async fn broadcast(&self, payload: &str, exclude: Option<ClientId>) {
        let targets: Vec<(ClientId, ClientSender)> = {
            let clients = self.clients.read().await;
            clients
                .iter()
                .filter(|(id, _)| Some(**id) != exclude)
                .map(|(id, slot)| (*id, slot.tx.clone()))
                .collect()
        };

        let mut failed = Vec::new();
        for (id, tx) in targets {
            if tx.send(Message::Text(payload.to_owned().into())).is_err() {
                warn!("Broadcast to client {id} failed, dropping it");
                failed.push(id);
            }
        }

        for id in failed {
            self.remove(id).await;
        }
    }

    /// Queue a message for one client; drops the client if its queue is
    /// gone.
    pub async fn send_to(&self, id: ClientId, message: Message) {
        let tx = {
            let clients = self.clients.read().await;
            clients.get(&id).map(|slot| slot.tx.clone())
        };

        if let Some(tx) = tx {
            if tx.send(message).is_err() {
                warn!("Send to client {id} failed, dropping it");
                self.remove(id).await;
            }
        }
    }

    /// Record proof of life for a client.
    pub async fn mark_alive(&self, id: ClientId) {
        let mut clients = self.clients.write().await;
        if let Some(slot) = clients.get_mut(&id) {
            slot.alive = true;
        }
    }

    /// Clear the liveness flag ahead of a probe.
    pub async fn clear_alive(&self, id: ClientId) {
        let mut clients = self.clients.write().await;
        if let Some(slot) = clients.get_mut(&id) {
            slot.alive = false;
        }
    }

    /// Snapshot of `(id, alive)` pairs for the liveness sweep.
    pub async fn liveness_snapshot(&self) -> Vec<(ClientId, bool)> {
        let clients = self.clients.read().await;
        clients.iter().map(|(id, slot)| (*id, slot.alive)).collect()
    }

    /// Forcibly terminate a client: best-effort close frame, then removal.
    pub async fn evict(&self, id: ClientId) {
        let slot = self.clients.write().await.remove(&id);
        if let Some(slot) = slot {
            let _ = slot.tx.send(Message::Close(None));
            debug!("Client {id} evicted");
        }
    }

    /// Evict every client. Called at server shutdown so in-flight sessions
    /// end and the listener can drain.
    pub async fn close_all(&self) {
        let ids: Vec<ClientId> = self.clients.read().await.keys().copied().collect();
        for id in ids {
            self.evict(id).await;
        }
    }
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}
