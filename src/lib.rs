//! Citegraph: citation graph builder for markdown note vaults
//!
//! Builds a citation graph among the notes of a vault. Each note may carry
//! a `# Meta` block with a DOI and an optional pre-recorded reference
//! list; notes lacking reference data are resolved through CrossRef. The
//! references that point at other notes in the same vault become wiki
//! links, written back into each note's meta block.
//!
//! # Core Concepts
//!
//! - **Meta block**: a delimited key-value region in a note, regenerated
//!   on each run
//! - **Qualifying note**: a note whose meta block parses and contains a
//!   non-empty DOI
//! - **In-vault link**: a reference whose DOI matches another note in the
//!   same vault
//!
//! # Example
//!
//! ```no_run
//! use citegraph::{
//!     ConsoleStatus, CrossrefClient, FsVault, LinkGenerator, LinkerConfig,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), citegraph::LinkError> {
//! let generator = LinkGenerator::new(
//!     Arc::new(FsVault::new("/path/to/vault")),
//!     Arc::new(CrossrefClient::new()),
//!     Arc::new(ConsoleStatus),
//!     LinkerConfig::default(),
//! );
//! let summary = generator.generate().await?;
//! println!("processed {} notes", summary.processed);
//! # Ok(())
//! # }
//! ```

pub mod linker;
pub mod lookup;
pub mod meta;
pub mod progress;
pub mod vault;

pub use linker::{LinkError, LinkGenerator, LinkerConfig, PaperInfo, RunSummary};
pub use lookup::{CrossrefClient, MetadataSource, WorkMetadata, WorkReference};
pub use progress::{ConsoleStatus, NullStatus, StatusSink};
pub use vault::{FsVault, NoteHandle, VaultError, VaultResult, VaultStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
