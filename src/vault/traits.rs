//! Vault storage trait definitions

use super::{NoteHandle, VaultResult};
use async_trait::async_trait;

/// Trait for note storage backends
///
/// Implementations must be thread-safe (Send + Sync). Enumeration must
/// return a stable order across calls so that duplicate-identifier
/// resolution stays reproducible between runs.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Enumerate all notes in the vault, in stable order
    fn list_notes(&self) -> VaultResult<Vec<NoteHandle>>;

    /// Read a note's full text content
    async fn read(&self, note: &NoteHandle) -> VaultResult<String>;

    /// Replace a note's full text content
    async fn write(&self, note: &NoteHandle, content: &str) -> VaultResult<()>;
}
