//! Best-effort removal of media files whose references are gone.
//!
//! Cleanup runs only after the rows that referenced the files have been
//! committed away. A failure here never undoes that commit: it is logged and
//! recorded in the [`CleanupReport`] so the caller can retry or sweep later.

use courtlog_media::MediaStore;
use courtlog_types::MediaReference;
use serde::Serialize;
use tracing::{debug, warn};

/// A file that could not be deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CleanupFailure {
    pub reference: MediaReference,
    pub error: String,
}

/// What happened to each file a delete or detach released.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Every reference a deletion was attempted for, in attempt order.
    pub attempted: Vec<MediaReference>,
    /// Files that existed and were removed.
    pub deleted: Vec<MediaReference>,
    /// References with no backing file.
    pub missing: Vec<MediaReference>,
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    /// True when no deletion failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Attempt to delete every file in `references`, continuing past failures.
pub fn remove_files<M>(media: &M, references: &[MediaReference]) -> CleanupReport
where
    M: MediaStore + ?Sized,
{
    let mut report = CleanupReport::default();
    for reference in references {
        report.attempted.push(reference.clone());
        match media.delete(reference) {
            Ok(true) => {
                debug!(%reference, "deleted media file");
                report.deleted.push(reference.clone());
            }
            Ok(false) => report.missing.push(reference.clone()),
            Err(e) => {
                warn!(%reference, error = %e, "failed to delete media file; leaving it behind");
                report.failures.push(CleanupFailure {
                    reference: reference.clone(),
                    error: e.to_string(),
                });
            }
        }
    }
    report
}
