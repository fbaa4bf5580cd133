//! Entity storage for Courtlog.
//!
//! This crate persists users and the three journal node kinds. It knows the
//! shape of the tree (every row's parent must exist, parents cannot change,
//! a parent with children cannot be deleted) but nothing about ownership or
//! media; those rules live in `courtlog-core`.
//!
//! # Transactions
//!
//! All access goes through closures: [`EntityStore::read`] for a consistent
//! view and [`EntityStore::transaction`] for all-or-nothing writes. A
//! transaction that returns an error leaves no trace.
//!
//! # Modules
//!
//! - [`error`] -- [`StoreError`] and [`StoreResult`]
//! - [`traits`] -- [`StoreView`], [`Transaction`], [`EntityStore`]
//! - [`memory`] -- [`InMemoryEntityStore`] for tests and embedding
//! - [`file`] -- [`FileEntityStore`], a single JSON document on disk

pub mod error;
pub mod file;
pub mod memory;
mod tables;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use file::FileEntityStore;
pub use memory::InMemoryEntityStore;
pub use traits::{EntityStore, StoreView, Transaction};
