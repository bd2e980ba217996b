//! Error types for the capture-and-share workflow

use thiserror::Error;

/// Result type alias for scoreshare operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing or sharing a card
#[derive(Error, Debug)]
pub enum Error {
    /// The environment refused storage access
    #[error("Storage permission denied")]
    PermissionDenied,

    /// Capture was requested before the surface completed a layout pass
    #[error("Capture surface has not been mounted")]
    UnmountedSurface,

    /// Rendering or encoding of the capture failed
    #[error("Capture failed: {0}")]
    CaptureFailure(String),

    /// The share target failed
    #[error("Share rejected: {0}")]
    ShareRejected(String),

    /// The user dismissed the share surface
    #[error("Share cancelled by user")]
    ShareCancelled,

    /// Deleting the temporary capture failed
    #[error("Cleanup failed: {0}")]
    CleanupFailure(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
