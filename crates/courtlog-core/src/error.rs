use courtlog_media::MediaError;
use courtlog_store::StoreError;
use courtlog_types::{MediaReference, NodeKey, UserId};

/// Coarse error classes, for callers that map errors onto a transport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    Validation,
    Storage,
    Media,
}

/// Errors returned by journal operations.
///
/// `NotFound`, `Unauthorized` and `Validation` are raised before anything is
/// written. `Storage` means the transaction was rolled back. `Media` is only
/// returned from store/load paths; cleanup failures are reported in a
/// [`CleanupReport`](crate::CleanupReport) instead.
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    /// The node does not exist, or a parent link points at a missing row.
    #[error("{0} not found")]
    NotFound(NodeKey),

    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// The reference is not in the node's media list.
    #[error("{reference} is not attached to {key}")]
    MediaNotAttached {
        key: NodeKey,
        reference: MediaReference,
    },

    /// The node exists but belongs to someone else.
    #[error("user {actor} is not allowed to access {key}")]
    Unauthorized { key: NodeKey, actor: UserId },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("media error: {0}")]
    Media(#[from] MediaError),
}

impl HierarchyError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::UserNotFound(_) | Self::MediaNotAttached { .. } => {
                ErrorKind::NotFound
            }
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Media(_) => ErrorKind::Media,
        }
    }
}

pub type HierarchyResult<T> = Result<T, HierarchyError>;
