use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use courtlog_types::{MediaCategory, MediaReference};

use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};
use crate::traits::MediaStore;

/// In-memory, HashMap-based media store.
///
/// Intended for tests and embedding. Upload validation follows the same
/// [`MediaConfig`] rules as the filesystem backend; `upload_dir` is ignored.
pub struct InMemoryMediaStore {
    config: MediaConfig,
    files: RwLock<HashMap<MediaReference, Vec<u8>>>,
}

impl InMemoryMediaStore {
    /// Create a new empty store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MediaConfig::default())
    }

    pub fn with_config(config: MediaConfig) -> Self {
        Self {
            config,
            files: RwLock::new(HashMap::new()),
        }
    }

    /// Number of files currently stored.
    pub fn len(&self) -> usize {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes across all stored files.
    pub fn total_bytes(&self) -> u64 {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|data| data.len() as u64)
            .sum()
    }

    /// Sorted list of every stored reference.
    pub fn all_references(&self) -> Vec<MediaReference> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        let mut refs: Vec<MediaReference> = files.keys().cloned().collect();
        refs.sort();
        refs
    }
}

impl Default for InMemoryMediaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaStore for InMemoryMediaStore {
    fn store(
        &self,
        data: &[u8],
        file_name: &str,
        category: MediaCategory,
    ) -> MediaResult<MediaReference> {
        let extension = self
            .config
            .check_upload(file_name, category, data.len() as u64)?;
        let reference =
            MediaReference::new(category, &uuid::Uuid::new_v4().to_string(), &extension)?;

        let mut files = self.files.write().map_err(|_| MediaError::LockPoisoned)?;
        files.insert(reference.clone(), data.to_vec());
        Ok(reference)
    }

    fn load(&self, reference: &MediaReference) -> MediaResult<Vec<u8>> {
        let files = self.files.read().map_err(|_| MediaError::LockPoisoned)?;
        files
            .get(reference)
            .cloned()
            .ok_or_else(|| MediaError::NotFound(reference.clone()))
    }

    fn delete(&self, reference: &MediaReference) -> MediaResult<bool> {
        let mut files = self.files.write().map_err(|_| MediaError::LockPoisoned)?;
        Ok(files.remove(reference).is_some())
    }

    fn exists(&self, reference: &MediaReference) -> MediaResult<bool> {
        let files = self.files.read().map_err(|_| MediaError::LockPoisoned)?;
        Ok(files.contains_key(reference))
    }
}

impl std::fmt::Debug for InMemoryMediaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryMediaStore")
            .field("file_count", &self.len())
            .finish()
    }
}
