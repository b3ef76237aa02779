//! Integration tests for metadata translation against the real filesystem
//! art source.

#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::{collections::HashMap, io::Write};

use base64::Engine;
use mpris_relay::mpris::{
    TranslateError,
    art::FileArtSource,
    metadata::translate,
};
use tempfile::NamedTempFile;
use zbus::zvariant::{ObjectPath, OwnedValue, Value};

fn owned(value: Value<'_>) -> OwnedValue {
    OwnedValue::try_from(value).unwrap()
}

fn bundle_with_art_url(art_url: &str) -> HashMap<String, OwnedValue> {
    let mut raw = HashMap::new();
    raw.insert(
        "mpris:trackid".to_string(),
        owned(Value::from(
            ObjectPath::try_from("/org/mpris/MediaPlayer2/Track/7").unwrap(),
        )),
    );
    raw.insert("xesam:album".to_string(), owned(Value::from("Homework")));
    raw.insert(
        "xesam:artist".to_string(),
        owned(Value::from(vec!["Daft Punk"])),
    );
    raw.insert("xesam:title".to_string(), owned(Value::from("Around the World")));
    raw.insert("mpris:length".to_string(), owned(Value::from(429_000_000_i64)));
    raw.insert("mpris:artUrl".to_string(), owned(Value::from(art_url)));
    raw
}

#[test]
fn translates_a_full_bundle_with_cover_art_from_disk() {
    let mut cover = NamedTempFile::new().unwrap();
    cover.write_all(b"fake png bytes").unwrap();
    let art_url = format!("file://{}", cover.path().display());

    let snapshot = translate(&bundle_with_art_url(&art_url), 93_000_000, &FileArtSource).unwrap();

    assert_eq!(snapshot.metadata.title, "Around the World");
    assert_eq!(snapshot.metadata.length, 429_000);
    assert_eq!(snapshot.position, 93_000);

    let expected = base64::engine::general_purpose::STANDARD.encode(b"fake png bytes");
    assert_eq!(snapshot.metadata.album_art.as_deref(), Some(expected.as_str()));
}

#[test]
fn unreadable_cover_art_degrades_without_failing_the_record() {
    let cover = NamedTempFile::new().unwrap();
    let art_url = format!("file://{}", cover.path().display());
    // Delete the file so the read fails.
    drop(cover);

    let snapshot = translate(&bundle_with_art_url(&art_url), 0, &FileArtSource).unwrap();

    assert!(snapshot.metadata.album_art.is_none());
    assert_eq!(snapshot.metadata.title, "Around the World");
}

#[test]
fn a_bundle_missing_a_required_key_is_rejected_wholesale() {
    let mut raw = bundle_with_art_url("file:///tmp/none.png");
    raw.remove("xesam:album");

    let result = translate(&raw, 0, &FileArtSource);

    assert_eq!(result, Err(TranslateError::MissingKey("xesam:album")));
}
