//! JSON-file entity store.
//!
//! The whole journal is one JSON document. Every committed transaction
//! rewrites it through a temporary file in the same directory followed by
//! an atomic rename, so the file on disk is always either the state before
//! or the state after a transaction.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::tables::Tables;
use crate::traits::{EntityStore, StoreView, Transaction};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    format: u32,
    tables: &'a Tables,
}

#[derive(Deserialize)]
struct SnapshotIn {
    format: u32,
    tables: Tables,
}

/// Entity store persisted as a single JSON file.
#[derive(Debug)]
pub struct FileEntityStore {
    path: PathBuf,
    tables: RwLock<Tables>,
}

impl FileEntityStore {
    /// Open the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        let tables = match fs::read(&path) {
            Ok(bytes) => {
                let snapshot: SnapshotIn = serde_json::from_slice(&bytes)
                    .map_err(|e| StoreError::Serialization(e.to_string()))?;
                if snapshot.format != FORMAT_VERSION {
                    return Err(StoreError::Serialization(format!(
                        "unsupported journal format {} (expected {FORMAT_VERSION})",
                        snapshot.format
                    )));
                }
                info!(
                    path = %path.display(),
                    rows = ?snapshot.tables.row_counts(),
                    "loaded journal"
                );
                snapshot.tables
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "starting new journal");
                Tables::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            tables: RwLock::new(tables),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of rows per node kind: (competitions, matches, games).
    pub fn row_counts(&self) -> (usize, usize, usize) {
        self.tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .row_counts()
    }

    fn persist(&self, tables: &Tables) -> StoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let tmp = tempfile::NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer_pretty(
                &mut writer,
                &SnapshotOut {
                    format: FORMAT_VERSION,
                    tables,
                },
            )
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

impl EntityStore for FileEntityStore {
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
        self.persist(&staged)?;
        *tables = staged;
        debug!(path = %self.path.display(), "committed transaction");
        Ok(out)
    }
}
