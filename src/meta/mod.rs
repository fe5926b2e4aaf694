//! Meta block parsing
//!
//! Locates the `# Meta` heading block in a note and extracts its key-value
//! entries. The block convention is a markdown heading whose text is `meta`
//! or `metadata` (case-insensitive, any level), followed by contiguous
//! non-blank, non-heading lines, each holding one `key: value` entry.
//!
//! Parsing is a two-phase scan: locate the block span by literal line
//! search, then split each entry line on its first colon. Values may
//! contain further colons. Parsing is pure and idempotent; a note without
//! a block yields an empty mapping, which marks it as a non-qualifying
//! note rather than an error.

mod writer;

pub use writer::{render_block, replace_block};

use std::collections::BTreeMap;
use std::ops::Range;

/// Key holding the note's DOI.
pub const DOI_KEY: &str = "doi";
/// Key holding the comma-separated reference list.
pub const REFS_KEY: &str = "refs";
/// Key holding the regenerated in-vault wiki links.
pub const LINKS_KEY: &str = "links";
/// Key holding the publication year enrichment.
pub const YEAR_KEY: &str = "year";

/// Check whether a line is a markdown heading introducing the meta block.
fn is_meta_heading(line: &str) -> bool {
    let trimmed = line.trim();
    let stripped = trimmed.trim_start_matches('#');
    if stripped.len() == trimmed.len() {
        return false; // not a heading
    }
    let token = stripped.trim();
    token.eq_ignore_ascii_case("meta") || token.eq_ignore_ascii_case("metadata")
}

/// Check whether a line is any markdown heading (terminates the block).
fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Locate the byte span of the meta block within `text`.
///
/// The span runs from the start of the heading line through the end of the
/// last entry line, including its trailing newline when present. Returns
/// `None` when no meta heading exists.
pub fn locate_block(text: &str) -> Option<Range<usize>> {
    let mut offset = 0;
    let mut start = None;
    for line in text.split_inclusive('\n') {
        offset += line.len();
        if is_meta_heading(line) {
            start = Some(offset - line.len());
            break;
        }
    }
    let start = start?;

    let mut end = offset;
    for line in text[offset..].split_inclusive('\n') {
        if line.trim().is_empty() || is_heading(line) {
            break;
        }
        end += line.len();
    }

    Some(start..end)
}

/// Parse the meta block of `text` into a key-value mapping.
///
/// Returns an empty mapping when no block matches. Each entry line is
/// split on its first colon with both halves trimmed; a line with no colon
/// yields an entry whose key is the whole trimmed line and whose value is
/// empty.
pub fn parse_block(text: &str) -> BTreeMap<String, String> {
    let mut fields = BTreeMap::new();

    let Some(span) = locate_block(text) else {
        return fields;
    };

    // Skip the heading line itself.
    let mut entries = text[span].lines();
    entries.next();

    for line in entries {
        let line = line.trim();
        match line.find(':') {
            Some(colon) => {
                let key = line[..colon].trim().to_string();
                let value = line[colon + 1..].trim().to_string();
                fields.insert(key, value);
            }
            None => {
                fields.insert(line.to_string(), String::new());
            }
        }
    }

    fields
}

/// Unwrap a markdown-style link `[identifier](url)`, yielding only the
/// bracketed text. Values not in link form are returned trimmed.
pub fn unwrap_link(value: &str) -> &str {
    let trimmed = value.trim();
    if let Some(rest) = trimmed.strip_prefix('[') {
        if trimmed.ends_with(')') {
            if let Some(close) = rest.find("](") {
                return rest[..close].trim();
            }
        }
    }
    trimmed
}

/// Split a comma-separated reference list into trimmed DOIs.
///
/// Empty segments are dropped, so a present-but-empty `refs:` value parses
/// to an empty list.
pub fn parse_ref_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
