use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("invalid media reference {reference:?}: {reason}")]
    InvalidMediaReference { reference: String, reason: String },

    #[error("unknown {kind} value: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}
