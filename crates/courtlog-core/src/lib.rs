//! Journal operations for Courtlog.
//!
//! [`HierarchyService`] is the entry point for everything an athlete does to
//! their journal: recording competitions, matches and games, editing them,
//! deleting them with everything underneath, and managing attached photos
//! and videos. [`AccountService`] registers the users who own journals.
//!
//! # Guarantees
//!
//! - Every read and write of a node first checks, in the same transaction,
//!   that the acting user owns the competition at the root of its chain.
//! - A delete removes the node and its whole subtree or nothing.
//! - Media files are removed only after the rows referencing them are gone.
//!   A file that cannot be removed is reported, never fatal.
//!
//! # Modules
//!
//! - [`service`] -- [`HierarchyService`] create/read/update/delete
//! - [`attachments`] -- photo and video lists, uploads and downloads
//! - [`guard`] -- [`OwnershipGuard`] and parent-chain owner resolution
//! - [`validation`] -- input checks run before any write
//! - [`cleanup`] -- best-effort media deletion and [`CleanupReport`]
//! - [`accounts`] -- [`AccountService`]

pub mod accounts;
pub mod attachments;
pub mod cleanup;
pub mod error;
pub mod guard;
pub mod outcome;
pub mod service;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use accounts::AccountService;
pub use cleanup::{CleanupFailure, CleanupReport};
pub use error::{ErrorKind, HierarchyError, HierarchyResult};
pub use guard::{Access, OwnershipGuard};
pub use outcome::{
    CompetitionSummary, DeleteOutcome, MatchSummary, MediaContent, MediaRemoval, RemovedRows,
    Upload,
};
pub use service::HierarchyService;
pub use validation::Validate;
