use std::fs;

use thiserror::Error;
use url::Url;

/// Errors reading cover-art bytes.
#[derive(Error, Debug)]
pub enum ArtError {
    /// The artwork URL does not point at a local file
    #[error("artwork URL '{0}' is not a local file")]
    NotLocal(String),

    /// Filesystem read failed
    #[error("failed to read artwork: {0}")]
    Io(#[from] std::io::Error),
}

/// Supplier of cover-art bytes for an artwork URL.
///
/// The translator treats any failure here as "no art": the snapshot is still
/// produced, with the art field omitted.
pub trait ArtSource: Send + Sync {
    /// Load the raw bytes behind an artwork URL.
    ///
    /// # Errors
    /// Returns [`ArtError`] if the URL is not local or the read fails.
    fn load(&self, art_url: &str) -> Result<Vec<u8>, ArtError>;
}

/// Reads `file://` artwork URLs from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileArtSource;

impl ArtSource for FileArtSource {
    fn load(&self, art_url: &str) -> Result<Vec<u8>, ArtError> {
        let path = Url::parse(art_url)
            .ok()
            .filter(|url| url.scheme() == "file")
            .and_then(|url| url.to_file_path().ok())
            .ok_or_else(|| ArtError::NotLocal(art_url.to_string()))?;

        Ok(fs::read(path)?)
    }
}
