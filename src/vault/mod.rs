//! Note vault storage
//!
//! The vault owns the notes; the pipeline only enumerates them and
//! reads/writes their full text through the [`VaultStore`] trait. No
//! transactional guarantees are assumed. [`FsVault`] is the filesystem
//! implementation walking a root directory for markdown files.

mod fs;
mod traits;

pub use fs::FsVault;
pub use traits::VaultStore;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during vault operations
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Vault walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Result type for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

/// Handle to a stored note: its path plus a stable display name.
///
/// The display name is the file stem and is what in-vault links render as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteHandle {
    /// Full path to the note within the vault
    pub path: PathBuf,
    /// Display name (file stem), used as the wiki-link target
    pub name: String,
}

impl NoteHandle {
    /// Create a handle for the given path, deriving the display name from
    /// the file stem.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { path, name }
    }
}

impl std::fmt::Display for NoteHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Check whether a path looks like a markdown note.
pub(crate) fn is_markdown(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}
