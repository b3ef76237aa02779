use thiserror::Error;

/// Errors from the MPRIS side of the bridge.
#[derive(Error, Debug)]
pub enum MprisError {
    /// No player with the configured name currently owns its bus name
    #[error("player '{0}' is not registered on the session bus")]
    PlayerNotFound(String),

    /// D-Bus communication error
    #[error("D-Bus operation failed: {0}")]
    Dbus(#[from] zbus::Error),

    /// The player's Metadata bundle could not be translated
    #[error(transparent)]
    Translate(#[from] TranslateError),
}

/// Terminal failure converting a raw Metadata bundle into a snapshot.
///
/// A bundle that fails translation is dropped wholesale; no partially filled
/// record is ever produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    /// A required metadata key was absent
    #[error("metadata key '{0}' is missing")]
    MissingKey(&'static str),

    /// A required metadata key carried an unexpected type
    #[error("metadata key '{0}' has an unexpected type")]
    MalformedKey(&'static str),
}
