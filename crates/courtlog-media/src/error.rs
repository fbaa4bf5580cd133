use courtlog_types::{MediaCategory, MediaReference, TypeError};

/// Errors from media store operations.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// No file backs the reference.
    #[error("media not found: {0}")]
    NotFound(MediaReference),

    /// The uploaded file name is unusable (empty, or contains `..`).
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),

    /// The extension is not on the category's allow list.
    #[error("file type .{extension} is not allowed for {category}")]
    ExtensionNotAllowed {
        extension: String,
        category: MediaCategory,
    },

    /// The upload exceeds the configured size limit.
    #[error("upload of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: u64 },

    /// A generated reference failed validation.
    #[error("invalid reference: {0}")]
    Reference(#[from] TypeError),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("media store lock poisoned")]
    LockPoisoned,
}

/// Result alias for media operations.
pub type MediaResult<T> = Result<T, MediaError>;
