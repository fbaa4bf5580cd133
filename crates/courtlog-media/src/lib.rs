//! Media storage for Courtlog.
//!
//! Photos and videos attached to journal nodes are kept outside the entity
//! store. Each file is addressed by a [`MediaReference`] of the form
//! `<category>/<random-id>.<ext>`; the store hands out references and never
//! learns which node owns them.
//!
//! # Storage Backends
//!
//! All backends implement the [`MediaStore`] trait:
//!
//! - [`InMemoryMediaStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsMediaStore`] -- one file per reference under a configured root
//!
//! # Design Rules
//!
//! 1. Every upload gets a fresh random id, never derived from the client name.
//! 2. Uploads are validated against [`MediaConfig`] before any byte is written.
//! 3. Deleting a missing file succeeds with `false`.
//! 4. All I/O errors are propagated; callers decide which ones are fatal.
//!
//! [`MediaReference`]: courtlog_types::MediaReference

pub mod config;
pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use config::MediaConfig;
pub use error::{MediaError, MediaResult};
pub use fs::FsMediaStore;
pub use memory::InMemoryMediaStore;
pub use traits::MediaStore;
