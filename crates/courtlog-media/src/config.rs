use std::path::PathBuf;

use courtlog_types::MediaCategory;
use serde::{Deserialize, Serialize};

use crate::error::{MediaError, MediaResult};

/// Configuration shared by the media store backends.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Root directory for the filesystem backend.
    pub upload_dir: PathBuf,
    /// Allowed lower-case extensions for photos.
    pub photo_extensions: Vec<String>,
    /// Allowed lower-case extensions for videos.
    pub video_extensions: Vec<String>,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            photo_extensions: ["jpg", "jpeg", "png", "gif", "webp"]
                .into_iter()
                .map(String::from)
                .collect(),
            video_extensions: ["mp4", "mov", "webm", "avi"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_upload_bytes: 500 * 1024 * 1024,
        }
    }
}

impl MediaConfig {
    /// Default configuration rooted at `upload_dir`.
    pub fn rooted_at(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            ..Default::default()
        }
    }

    pub fn allowed_extensions(&self, category: MediaCategory) -> &[String] {
        match category {
            MediaCategory::Photos => &self.photo_extensions,
            MediaCategory::Videos => &self.video_extensions,
        }
    }

    /// Validate an upload and return the normalized extension to store it under.
    pub fn check_upload(
        &self,
        file_name: &str,
        category: MediaCategory,
        size: u64,
    ) -> MediaResult<String> {
        let file_name = file_name.trim();
        if file_name.is_empty() || file_name.contains("..") {
            return Err(MediaError::InvalidFileName(file_name.to_string()));
        }
        if size > self.max_upload_bytes {
            return Err(MediaError::TooLarge {
                size,
                limit: self.max_upload_bytes,
            });
        }

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !self
            .allowed_extensions(category)
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
        {
            return Err(MediaError::ExtensionNotAllowed {
                extension,
                category,
            });
        }
        Ok(extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_allowed_extension_case_insensitively() {
        let config = MediaConfig::default();
        let ext = config
            .check_upload("Finals.JPG", MediaCategory::Photos, 10)
            .unwrap();
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn rejects_dot_dot() {
        let config = MediaConfig::default();
        let err = config
            .check_upload("../../etc/passwd.jpg", MediaCategory::Photos, 10)
            .unwrap_err();
        assert!(matches!(err, MediaError::InvalidFileName(_)));
    }

    #[test]
    fn rejects_wrong_category() {
        let config = MediaConfig::default();
        let err = config
            .check_upload("clip.mp4", MediaCategory::Photos, 10)
            .unwrap_err();
        assert!(matches!(err, MediaError::ExtensionNotAllowed { .. }));
    }

    #[test]
    fn rejects_missing_extension() {
        let config = MediaConfig::default();
        assert!(config
            .check_upload("README", MediaCategory::Videos, 10)
            .is_err());
    }

    #[test]
    fn rejects_oversized() {
        let config = MediaConfig {
            max_upload_bytes: 4,
            ..Default::default()
        };
        let err = config
            .check_upload("a.png", MediaCategory::Photos, 5)
            .unwrap_err();
        assert!(matches!(err, MediaError::TooLarge { size: 5, limit: 4 }));
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: MediaConfig = toml::from_str("upload_dir = \"/srv/media\"").unwrap();
        assert_eq!(config.upload_dir, PathBuf::from("/srv/media"));
        assert_eq!(config.photo_extensions, MediaConfig::default().photo_extensions);
    }
}
