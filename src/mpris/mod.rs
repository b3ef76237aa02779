/// Cover-art loading with graceful degradation.
pub mod art;
/// MPRIS error types.
pub mod error;
/// Raw property bundle to canonical snapshot translation.
pub mod metadata;
/// Fixed-cadence position polling.
pub mod poller;
/// D-Bus proxy trait definitions.
pub mod proxy;
/// Fixed-backoff reconnection.
pub mod reconnect;
/// Player connection watcher.
pub mod watcher;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{MprisError, TranslateError};
pub use metadata::{PositionSample, Snapshot, TrackMetadata};
pub use proxy::MediaPlayer2PlayerProxy;
