//! Filesystem media store.
//!
//! Each reference maps to `<root>/<category>/<id>.<ext>`. Files are written
//! to a temporary file in the category directory and renamed into place.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use courtlog_types::{MediaCategory, MediaReference};
use tracing::debug;

use crate::config::MediaConfig;
use crate::error::{MediaError, MediaResult};
use crate::traits::MediaStore;

/// Filesystem media store.
///
/// Layout:
/// ```text
/// <upload_dir>/
///   photos/<uuid>.<ext>
///   videos/<uuid>.<ext>
/// ```
///
/// Files are written to a temporary file in the target directory and then
/// renamed into place, so a reader never observes a partially written file.
#[derive(Debug)]
pub struct FsMediaStore {
    root: PathBuf,
    config: MediaConfig,
}

impl FsMediaStore {
    /// Open the store, creating the root and category directories if needed.
    pub fn open(config: MediaConfig) -> MediaResult<Self> {
        let root = config.upload_dir.clone();
        for category in MediaCategory::ALL {
            fs::create_dir_all(root.join(category.dir_name()))?;
        }
        debug!(root = %root.display(), "opened media store");
        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the file behind a reference.
    ///
    /// References are validated on parse and cannot contain `..` or nested
    /// separators, so the result always lies inside the root.
    pub fn path_for(&self, reference: &MediaReference) -> PathBuf {
        self.root
            .join(reference.category().dir_name())
            .join(reference.file_name())
    }
}

impl MediaStore for FsMediaStore {
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

        let dir = self.root.join(category.dir_name());
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.path_for(&reference))
            .map_err(|e| MediaError::Io(e.error))?;

        debug!(%reference, bytes = data.len(), "stored media");
        Ok(reference)
    }

    fn load(&self, reference: &MediaReference) -> MediaResult<Vec<u8>> {
        match fs::read(self.path_for(reference)) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(MediaError::NotFound(reference.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, reference: &MediaReference) -> MediaResult<bool> {
        match fs::remove_file(self.path_for(reference)) {
            Ok(()) => {
                debug!(%reference, "deleted media");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn exists(&self, reference: &MediaReference) -> MediaResult<bool> {
        Ok(self.path_for(reference).try_exists()?)
    }
}
