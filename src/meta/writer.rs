//! Meta block rendering and in-place replacement
//!
//! Regenerates a note's meta block from resolved citation data and splices
//! it over the existing block span, preserving every byte outside the span.

use super::{locate_block, DOI_KEY, LINKS_KEY, REFS_KEY, YEAR_KEY};

/// Render a meta block from resolved citation data.
///
/// The `doi` line is always present. `year` is emitted only when supplied
/// (the pipeline passes it only when enrichment is configured and the value
/// is available). `refs` and `links` lines are emitted only when non-empty;
/// links are rendered as `[[name]]` wiki links to the target notes.
pub fn render_block(doi: &str, year: Option<&str>, refs: &[String], links: &[&str]) -> String {
    let mut block = String::from("# Meta\n");
    block.push_str(&format!("{}: {}\n", DOI_KEY, doi));
    if let Some(year) = year {
        block.push_str(&format!("{}: {}\n", YEAR_KEY, year));
    }
    if !refs.is_empty() {
        block.push_str(&format!("{}: {}\n", REFS_KEY, refs.join(", ")));
    }
    if !links.is_empty() {
        let rendered: Vec<String> = links.iter().map(|name| format!("[[{}]]", name)).collect();
        block.push_str(&format!("{}: {}\n", LINKS_KEY, rendered.join(" ")));
    }
    block
}

/// Replace the meta block in `text` with `block`.
///
/// Locates the current block span and splices the new block over exactly
/// that span. Returns `None` when no block marker is present — the caller
/// must not fabricate a block position, it skips the note and reports the
/// anomaly instead.
pub fn replace_block(text: &str, block: &str) -> Option<String> {
    let span = locate_block(text)?;
    let mut updated = String::with_capacity(text.len() - span.len() + block.len());
    updated.push_str(&text[..span.start]);
    updated.push_str(block);
    updated.push_str(&text[span.end..]);
    Some(updated)
}
