use courtlog_types::{MediaCategory, MediaReference};

use crate::error::MediaResult;

/// Persistence for uploaded photos and videos.
///
/// All implementations must satisfy these invariants:
/// - Every stored file gets a fresh random id; storing the same bytes twice
///   yields two references.
/// - The store knows nothing about which node owns a reference.
/// - `delete` of a missing file is not an error; it returns `Ok(false)`.
/// - All I/O errors are propagated. Whether a failure is fatal is the
///   caller's decision.
pub trait MediaStore: Send + Sync {
    /// Persist `data` under `category` and return its new reference.
    ///
    /// `file_name` is the client-side name; only its extension is kept.
    fn store(
        &self,
        data: &[u8],
        file_name: &str,
        category: MediaCategory,
    ) -> MediaResult<MediaReference>;

    /// Read the bytes behind a reference.
    ///
    /// Returns `Err(MediaError::NotFound)` if no file backs it.
    fn load(&self, reference: &MediaReference) -> MediaResult<Vec<u8>>;

    /// Delete the file behind a reference. Returns `true` if it existed.
    fn delete(&self, reference: &MediaReference) -> MediaResult<bool>;

    /// Check whether a file backs the reference.
    fn exists(&self, reference: &MediaReference) -> MediaResult<bool>;
}
