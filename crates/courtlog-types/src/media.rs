use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Closed set of media categories. Each maps to one storage directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    /// Competition photos.
    Photos,
    /// Game recordings.
    Videos,
}

impl MediaCategory {
    pub const ALL: [MediaCategory; 2] = [MediaCategory::Photos, MediaCategory::Videos];

    /// Directory name used as the first path segment of a reference.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Photos => "photos",
            Self::Videos => "videos",
        }
    }

    /// Parse from a directory name.
    pub fn from_dir_name(name: &str) -> Option<Self> {
        match name {
            "photos" => Some(Self::Photos),
            "videos" => Some(Self::Videos),
            _ => None,
        }
    }
}

impl fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for MediaCategory {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_dir_name(s).ok_or_else(|| TypeError::UnknownVariant {
            kind: "media category",
            value: s.to_string(),
        })
    }
}

/// Relative path of a stored media file: `<category>/<id>.<ext>`.
///
/// The string is opaque to everything above the media store; the only
/// structure callers rely on is the category prefix. Parsing rejects path
/// separators inside the file name, parent-directory segments and empty
/// components, so a valid reference can always be joined onto a storage
/// root without escaping it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MediaReference {
    path: String,
    category: MediaCategory,
}

impl MediaReference {
    /// Build a reference from its parts.
    pub fn new(category: MediaCategory, stem: &str, extension: &str) -> Result<Self, TypeError> {
        Self::parse(&format!("{}/{stem}.{extension}", category.dir_name()))
    }

    /// Parse and validate a reference string.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let invalid = |reason: &str| TypeError::InvalidMediaReference {
            reference: s.to_string(),
            reason: reason.to_string(),
        };

        let (dir, file) = s.split_once('/').ok_or_else(|| invalid("missing category"))?;
        let category =
            MediaCategory::from_dir_name(dir).ok_or_else(|| invalid("unknown category"))?;
        let (stem, ext) = file
            .rsplit_once('.')
            .ok_or_else(|| invalid("missing extension"))?;

        if stem.is_empty() {
            return Err(invalid("empty file id"));
        }
        if !stem
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(invalid("file id contains invalid characters"));
        }
        if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid("invalid extension"));
        }

        Ok(Self {
            path: s.to_string(),
            category,
        })
    }

    /// The full relative path.
    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn category(&self) -> MediaCategory {
        self.category
    }

    /// File name without the category prefix.
    pub fn file_name(&self) -> &str {
        &self.path[self.category.dir_name().len() + 1..]
    }

    /// Lower-cased extension.
    pub fn extension(&self) -> String {
        self.path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default()
    }

    /// MIME type to serve the file with.
    pub fn content_type(&self) -> &'static str {
        let ext = self.extension();
        match (self.category, ext.as_str()) {
            (MediaCategory::Photos, "jpg" | "jpeg") => "image/jpeg",
            (MediaCategory::Photos, "png") => "image/png",
            (MediaCategory::Photos, "gif") => "image/gif",
            (MediaCategory::Photos, "webp") => "image/webp",
            (MediaCategory::Videos, "webm") => "video/webm",
            (MediaCategory::Videos, "mov") => "video/quicktime",
            (MediaCategory::Videos, _) => "video/mp4",
            _ => "application/octet-stream",
        }
    }
}

impl fmt::Debug for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MediaReference({})", self.path)
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl FromStr for MediaReference {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MediaReference {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<MediaReference> for String {
    fn from(value: MediaReference) -> Self {
        value.path
    }
}
