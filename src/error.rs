use thiserror::Error;

/// Errors that can abort relay startup.
///
/// Everything after startup is handled locally by the component it occurs
/// in; no runtime error is process-fatal.
#[derive(Error, Debug)]
pub enum RelayError {
    /// D-Bus session connection could not be established
    #[error("D-Bus operation failed: {0}")]
    Dbus(#[from] zbus::Error),

    /// Listener bind or serve error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tracing subscriber initialization failed
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}
