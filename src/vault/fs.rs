//! Filesystem vault backend
//!
//! Walks a root directory for markdown files. Enumeration is sorted by
//! path so the processing order is stable across runs regardless of
//! directory iteration order.

use super::{is_markdown, NoteHandle, VaultResult, VaultStore};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Vault backed by a directory of markdown files
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    /// Create a vault rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The vault root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl VaultStore for FsVault {
    fn list_notes(&self) -> VaultResult<Vec<NoteHandle>> {
        let mut paths = Vec::new();
        for entry in WalkDir::new(&self.root) {
            let entry = entry?;
            if entry.file_type().is_file() && is_markdown(entry.path()) {
                paths.push(entry.into_path());
            }
        }
        paths.sort();
        Ok(paths.into_iter().map(NoteHandle::new).collect())
    }

    async fn read(&self, note: &NoteHandle) -> VaultResult<String> {
        Ok(tokio::fs::read_to_string(&note.path).await?)
    }

    async fn write(&self, note: &NoteHandle, content: &str) -> VaultResult<()> {
        Ok(tokio::fs::write(&note.path, content).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn vault_with_files(files: &[(&str, &str)]) -> (TempDir, FsVault) {
        let dir = TempDir::new().unwrap();
        for (rel, content) in files {
            let path = dir.path().join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
        let vault = FsVault::new(dir.path());
        (dir, vault)
    }

    #[tokio::test]
    async fn test_list_notes_sorted_markdown_only() {
        let (_dir, vault) = vault_with_files(&[
            ("b.md", ""),
            ("a.md", ""),
            ("notes/c.md", ""),
            ("skip.txt", ""),
        ]);

        let notes = vault.list_notes().unwrap();
        let names: Vec<&str> = notes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_read_write_round_trip() {
        let (_dir, vault) = vault_with_files(&[("note.md", "original")]);
        let notes = vault.list_notes().unwrap();
        assert_eq!(notes.len(), 1);

        assert_eq!(vault.read(&notes[0]).await.unwrap(), "original");
        vault.write(&notes[0], "replaced").await.unwrap();
        assert_eq!(vault.read(&notes[0]).await.unwrap(), "replaced");
    }

    #[tokio::test]
    async fn test_missing_root_is_error() {
        let vault = FsVault::new("/nonexistent/citegraph-test-vault");
        assert!(vault.list_notes().is_err());
    }
}
