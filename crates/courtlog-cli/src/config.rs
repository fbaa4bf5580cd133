use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use courtlog_media::MediaConfig;
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "courtlog.toml";

const JOURNAL_FILE: &str = "journal.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Directory holding the journal file and, by default, the uploads.
    pub data_dir: PathBuf,
    pub log_level: String,
    /// Username to act as when `--user` is not given.
    pub default_user: Option<String>,
    pub media: MediaConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".courtlog"),
            log_level: "info".into(),
            default_user: None,
            media: MediaConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if present.
    ///
    /// An explicit path must exist; a missing default file means defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn journal_path(&self) -> PathBuf {
        self.data_dir.join(JOURNAL_FILE)
    }

    /// Media settings with a relative upload directory resolved under `data_dir`.
    pub fn media_config(&self) -> MediaConfig {
        let mut media = self.media.clone();
        if media.upload_dir.is_relative() {
            media.upload_dir = self.data_dir.join(&media.upload_dir);
        }
        media
    }

    pub fn level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown log level {:?}", self.log_level))
    }
}
