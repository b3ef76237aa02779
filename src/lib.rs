//! mpris-relay - MPRIS to WebSocket bridge.
//!
//! Watches a single MPRIS player on the D-Bus session bus and fans playback
//! metadata and position updates out to any number of WebSocket subscribers.
//! The process is designed to run indefinitely: a missing or restarting
//! player is reconnected with a fixed backoff, malformed metadata updates
//! are dropped, and a misbehaving subscriber never disturbs the rest.
//!
//! The moving parts:
//!
//! - [`mpris::watcher::PlaybackWatcher`] owns the player connection and keeps
//!   the shared snapshot current from change notifications.
//! - [`mpris::poller::PositionPoller`] supplements the notifications with a
//!   fixed-cadence position poll, which doubles as the disconnect detector.
//! - [`server::registry::ClientRegistry`] tracks subscribers and broadcasts
//!   to them with per-client failure isolation.
//! - [`server::liveness::LivenessMonitor`] evicts subscribers that stop
//!   answering probes.

/// Command-line interface and runtime configuration.
pub mod cli;

/// Shared server context with explicit initialization and shutdown.
pub mod context;

/// Top-level error types.
pub mod error;

/// MPRIS property-bus integration: proxy, translation, watch and poll loops.
pub mod mpris;

/// WebSocket server surface: registry, liveness probing, client sessions.
pub mod server;

/// Tracing initialization.
pub mod tracing_config;

pub use error::RelayError;
