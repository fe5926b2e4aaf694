//! Reference resolution
//!
//! Decides, per note, whether the pre-recorded reference list suffices or
//! an external lookup is required, and performs the lookups strictly
//! sequentially in batch order. Sequential calls keep the progress status
//! monotone and avoid hammering the lookup service; wall-clock scales
//! linearly with the number of notes needing lookup.

use super::types::{LinkerConfig, PaperInfo};
use crate::lookup::MetadataSource;
use crate::meta::YEAR_KEY;
use crate::progress::StatusSink;
use tracing::debug;

/// Whether a note needs an external lookup.
///
/// True when it has no references at all, or when year enrichment is
/// configured and the year is still missing.
fn needs_lookup(paper: &PaperInfo, config: &LinkerConfig) -> bool {
    paper.references.is_empty()
        || (config.fetch_year && !paper.extra_fields.contains_key(YEAR_KEY))
}

/// Resolve references for every note in the batch. Returns the number of
/// lookup calls performed.
///
/// A failed lookup leaves the note's references as they are — empty if
/// none were pre-recorded — and the note proceeds with what was available.
pub(super) async fn resolve_references(
    papers: &mut [PaperInfo],
    source: &dyn MetadataSource,
    config: &LinkerConfig,
    status: &dyn StatusSink,
) -> usize {
    let total = papers.len();
    let mut looked_up = 0;

    for (i, paper) in papers.iter_mut().enumerate() {
        status.set_status(&format!("Resolving references {}/{}", i + 1, total));

        if !needs_lookup(paper, config) {
            continue;
        }

        looked_up += 1;
        let Some(work) = source.lookup(&paper.doi).await else {
            debug!(doi = %paper.doi, "lookup yielded nothing, keeping existing references");
            continue;
        };

        for reference in work.references {
            let Some(doi) = reference.doi else { continue };
            let doi = doi.trim();
            if doi.is_empty() {
                continue;
            }
            paper.references.push(doi.to_string());
        }

        if config.fetch_year {
            if let Some(year) = work.issued_year {
                paper
                    .extra_fields
                    .insert(YEAR_KEY.to_string(), year.to_string());
            }
        }
    }

    looked_up
}
