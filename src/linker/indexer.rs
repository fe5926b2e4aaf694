//! Cross-reference indexing
//!
//! Builds the DOI→note index and computes, for every note, the subset of
//! its references that resolve to another note in the batch.

use super::types::PaperInfo;
use crate::progress::StatusSink;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Build the DOI→batch-index map in original batch order.
///
/// On a collision the first-seen entry stays authoritative; the duplicate
/// is reported through the sink, naming both notes, and is never used as a
/// link target. Returns the map and the number of duplicates detected.
pub(super) fn build_index(
    papers: &[PaperInfo],
    status: &dyn StatusSink,
) -> (HashMap<String, usize>, usize) {
    let mut index = HashMap::with_capacity(papers.len());
    let mut duplicates = 0;

    for (i, paper) in papers.iter().enumerate() {
        match index.entry(paper.doi.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(i);
            }
            Entry::Occupied(slot) => {
                let first = &papers[*slot.get()];
                status.warn(&format!(
                    "duplicate doi '{}' in '{}' and '{}'; keeping '{}'",
                    paper.doi, first.note.name, paper.note.name, first.note.name
                ));
                duplicates += 1;
            }
        }
    }

    (index, duplicates)
}

/// Compute in-vault links for every note.
///
/// References are walked in order; each DOI present in the index appends
/// the indexed batch position. A DOI appearing multiple times in the
/// reference list produces a duplicate links entry, and a note referencing
/// its own DOI links to itself — neither is filtered.
pub(super) fn compute_links(papers: &mut [PaperInfo], index: &HashMap<String, usize>) {
    for paper in papers.iter_mut() {
        paper.links = paper
            .references
            .iter()
            .filter_map(|doi| index.get(doi).copied())
            .collect();
    }
}
