//! Error types for the player controller

use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// The engine reported a failure while decoding or loading a source
    #[error("failed to load source: {0}")]
    LoadFailure(String),

    /// Catalog index out of range
    ///
    /// The UI only ever offers valid indices, so hitting this is a caller
    /// contract violation rather than a user-facing condition.
    #[error("catalog index {index} out of range (catalog holds {len} sources)")]
    InvalidSelection { index: usize, len: usize },

    /// Upload rejected by the file-type policy
    #[error("unsupported file type: {0:?} (only .mp3 uploads are accepted)")]
    UnsupportedFileType(String),

    /// A playable reference could not be produced for an uploaded file
    #[error("failed to resolve upload: {0}")]
    UploadFailed(String),
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
