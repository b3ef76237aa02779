use std::collections::HashMap;

use base64::Engine;
use serde::Serialize;
use tracing::debug;
use zbus::zvariant::{OwnedObjectPath, OwnedValue};

use super::{art::ArtSource, error::TranslateError};

/// Factor between MPRIS microsecond values and the milliseconds clients see.
const UNIT_DIVISOR: i64 = 1000;

/// Canonical record of what is playing.
///
/// Immutable once constructed; the watcher replaces the whole record on each
/// change rather than mutating fields in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackMetadata {
    /// Base64-encoded cover art, omitted when unreadable.
    #[serde(rename = "albumArt", skip_serializing_if = "Option::is_none")]
    pub album_art: Option<String>,

    /// Track length in milliseconds.
    pub length: i64,

    /// MPRIS track identifier.
    pub trackid: String,

    /// Album name.
    pub album: String,

    /// Joined artist names.
    pub artist: String,

    /// Track title.
    pub title: String,
}

/// Playback position in milliseconds, broadcast on every poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionSample {
    /// Position in milliseconds.
    pub position: i64,
}

impl PositionSample {
    /// Convert a raw MPRIS microsecond position.
    pub fn from_micros(position_us: i64) -> Self {
        Self {
            position: position_us / UNIT_DIVISOR,
        }
    }

    /// Wire encoding of the sample.
    pub fn to_json(self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// The single most-recent state known to the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Metadata of the current track.
    pub metadata: TrackMetadata,

    /// Position within it, in milliseconds.
    pub position: i64,
}

impl Snapshot {
    /// Wire encoding of the snapshot.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Translate a raw `Metadata` property bundle plus a raw position into a
/// snapshot.
///
/// The five required keys (`mpris:trackid`, `xesam:album`, `xesam:artist`,
/// `xesam:title`, `mpris:length`) must be present and well-typed or the
/// whole translation fails. Cover art is best-effort: an absent or
/// unreadable `mpris:artUrl` leaves the field out and never fails the
/// translation. Microsecond values are converted to milliseconds.
///
/// # Errors
/// Returns [`TranslateError`] if a required key is missing or malformed.
pub fn translate(
    raw: &HashMap<String, OwnedValue>,
    position_us: i64,
    art: &dyn ArtSource,
) -> Result<Snapshot, TranslateError> {
    let trackid = required_trackid(raw)?;
    let album = required_string(raw, "xesam:album")?;
    let artist = required_artist(raw)?;
    let title = required_string(raw, "xesam:title")?;
    let length = required_length(raw)? / UNIT_DIVISOR;

    let album_art = raw
        .get("mpris:artUrl")
        .and_then(|value| String::try_from(value.clone()).ok())
        .and_then(|art_url| match art.load(&art_url) {
            Ok(bytes) => Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
            Err(e) => {
                debug!("Cover art unavailable for {art_url}: {e}");
                None
            }
        });

    Ok(Snapshot {
        metadata: TrackMetadata {
            album_art,
            length,
            trackid,
            album,
            artist,
            title,
        },
        position: position_us / UNIT_DIVISOR,
    })
}

fn required_string(
    raw: &HashMap<String, OwnedValue>,
    key: &'static str,
) -> Result<String, TranslateError> {
    let value = raw.get(key).ok_or(TranslateError::MissingKey(key))?;
    String::try_from(value.clone()).map_err(|_| TranslateError::MalformedKey(key))
}

/// `mpris:trackid` is an object path in most players, a plain string in a
/// few. Only this key accepts the object-path form.
fn required_trackid(raw: &HashMap<String, OwnedValue>) -> Result<String, TranslateError> {
    const KEY: &str = "mpris:trackid";
    let value = raw.get(KEY).ok_or(TranslateError::MissingKey(KEY))?;

    if let Ok(text) = String::try_from(value.clone()) {
        return Ok(text);
    }
    if let Ok(path) = OwnedObjectPath::try_from(value.clone()) {
        return Ok(path.to_string());
    }

    Err(TranslateError::MalformedKey(KEY))
}

/// Artists arrive as an array of strings in well-behaved players, but some
/// send a plain string; both are accepted.
fn required_artist(raw: &HashMap<String, OwnedValue>) -> Result<String, TranslateError> {
    const KEY: &str = "xesam:artist";
    let value = raw.get(KEY).ok_or(TranslateError::MissingKey(KEY))?;

    if let Ok(array) = <&zbus::zvariant::Array>::try_from(value) {
        let artists: Vec<String> = array
            .iter()
            .filter_map(|artist| {
                if let Ok(s) = artist.downcast_ref::<String>() {
                    Some(s.clone())
                } else if let Ok(s) = artist.downcast_ref::<&str>() {
                    Some(s.to_string())
                } else {
                    None
                }
            })
            .collect();

        if artists.is_empty() {
            return Err(TranslateError::MalformedKey(KEY));
        }
        return Ok(artists.join(", "));
    }

    String::try_from(value.clone()).map_err(|_| TranslateError::MalformedKey(KEY))
}

fn required_length(raw: &HashMap<String, OwnedValue>) -> Result<i64, TranslateError> {
    const KEY: &str = "mpris:length";
    let value = raw.get(KEY).ok_or(TranslateError::MissingKey(KEY))?;

    if let Ok(length_us) = i64::try_from(value.clone()) {
        return Ok(length_us);
    }
    if let Ok(length_us) = u64::try_from(value.clone()) {
        return Ok(i64::try_from(length_us).unwrap_or(i64::MAX));
    }

    Err(TranslateError::MalformedKey(KEY))
}
