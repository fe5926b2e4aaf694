//! Core types for the link-generation pipeline

use crate::vault::{NoteHandle, VaultError};
use std::collections::BTreeMap;
use thiserror::Error;

/// Working record for one qualifying note, alive for one pipeline pass.
///
/// A record exists only for notes whose meta block parses and contains a
/// non-empty DOI. `links` holds batch indices rather than owned references;
/// the batch vector owns every record and display names resolve through it
/// at render time.
#[derive(Debug, Clone)]
pub struct PaperInfo {
    /// The owning note
    pub note: NoteHandle,
    /// The note's DOI; unique across the batch, first occurrence wins
    pub doi: String,
    /// Raw cited DOIs, pre-recorded or fetched
    pub references: Vec<String>,
    /// Batch indices of references that resolve to another note in the
    /// batch. Duplicates and self-links are preserved, not filtered.
    pub links: Vec<usize>,
    /// Supplementary metadata (publication year under `year`)
    pub extra_fields: BTreeMap<String, String>,
}

impl PaperInfo {
    pub fn new(note: NoteHandle, doi: impl Into<String>) -> Self {
        Self {
            note,
            doi: doi.into(),
            references: Vec::new(),
            links: Vec::new(),
            extra_fields: BTreeMap::new(),
        }
    }

    /// The recorded publication year, if any.
    pub fn year(&self) -> Option<&str> {
        self.extra_fields.get(crate::meta::YEAR_KEY).map(String::as_str)
    }
}

/// Configuration for link generation
#[derive(Debug, Clone, Default)]
pub struct LinkerConfig {
    /// Fetch and persist publication years from the lookup service
    pub fetch_year: bool,
}

/// Counts reported after a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Qualifying notes processed
    pub processed: usize,
    /// Lookup calls performed
    pub looked_up: usize,
    /// Duplicate DOIs detected (first occurrence kept)
    pub duplicate_dois: usize,
    /// Notes whose write-back was skipped (missing block or write failure)
    pub skipped_writes: usize,
}

/// Errors that abort a whole run
///
/// Per-note failures never surface here; they degrade to warnings and the
/// batch continues.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Link generation is already running")]
    AlreadyRunning,

    #[error("Vault error: {0}")]
    Vault(#[from] VaultError),
}
