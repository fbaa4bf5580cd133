//! Error types for entity store operations.

use courtlog_types::{NodeKey, ParentKey, UserId};
use thiserror::Error;

/// Errors that can occur while reading or committing rows.
///
/// Any error returned from inside a transaction rolls the whole transaction
/// back.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A delete addressed a row that does not exist.
    #[error("row not found: {key}")]
    RowNotFound { key: NodeKey },

    /// A saved row points at a parent that does not exist.
    #[error("{child} references missing parent {parent:?}")]
    DanglingParent { child: NodeKey, parent: ParentKey },

    /// A save tried to move an existing row to another parent.
    #[error("parent of {key} cannot change")]
    ParentChanged { key: NodeKey },

    /// A delete would orphan child rows.
    #[error("{key} still has child rows")]
    HasChildren { key: NodeKey },

    /// A unique user column already holds this value.
    #[error("{field} already taken: {value}")]
    Conflict { field: &'static str, value: String },

    /// The user row does not exist.
    #[error("user not found: {0}")]
    UserNotFound(UserId),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from a file-backed store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure reported by a storage backend.
    #[error("backend error: {0}")]
    Backend(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Convenience type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
