//! In-memory entity store for testing and embedding.
//!
//! [`InMemoryEntityStore`] keeps all rows in maps behind a `RwLock`. Each
//! transaction works on a private copy of the tables that replaces the live
//! tables only when the closure succeeds.

use std::sync::{PoisonError, RwLock};

use tracing::debug;

use crate::error::StoreError;
use crate::tables::Tables;
use crate::traits::{EntityStore, StoreView, Transaction};

/// An in-memory implementation of [`EntityStore`].
///
/// Transactions are serialized by the write lock. Data is lost when the
/// store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryEntityStore {
    tables: RwLock<Tables>,
}

impl InMemoryEntityStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows per node kind: (competitions, matches, games).
    pub fn row_counts(&self) -> (usize, usize, usize) {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .row_counts()
    }

    pub fn user_count(&self) -> usize {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user_count()
    }
}

impl EntityStore for InMemoryEntityStore {
    fn read<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&dyn StoreView) -> Result<T, E>,
        E: From<StoreError>,
    {
        let tables = self.tables.read().map_err(|_| StoreError::LockPoisoned)?;
        f(&*tables)
    }

    fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T, E>,
        E: From<StoreError>,
    {
        let mut tables = self.tables.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut staged = tables.clone();
        let out = f(&mut staged)?;
        *tables = staged;
        debug!(rows = ?tables.row_counts(), "committed transaction");
        Ok(out)
    }
}
