//! Centralized filename parsing for the `YYYY-MM-DD-name.md` convention.
//!
//! Every document file follows the same naming pattern: a 10-character ISO
//! date prefix, one separator character, the display name, and the `.md`
//! extension. This module provides the single parsing function the tree
//! builder uses to validate leaf filenames, plus the title-casing rule shared
//! by all node kinds.
//!
//! ## Display Titles
//!
//! Dashes in the name portion become spaces and each word is title-cased:
//! - `2023-01-01-hello-world.md` → name `hello-world`, title "Hello World"
//! - `notes/` (directory) → name `notes`, title "Notes"

use chrono::NaiveDate;

/// Result of parsing a leaf filename like `2023-01-01-hello-world.md`.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafName {
    /// Date parsed from the 10-character prefix.
    pub date: NaiveDate,
    /// Name part after the prefix and separator, extension stripped.
    /// Dashes preserved; may be empty for a bare `2023-01-01-.md`.
    pub name: String,
}

/// Parse a leaf filename following the `YYYY-MM-DD-name.md` convention.
///
/// Returns `None` when the filename does not match the convention: missing
/// `.md` extension, too short to hold a date prefix plus separator, or a
/// prefix that is not a valid calendar date. The tree builder turns `None`
/// into a fatal build error, so malformed input never reaches rendering.
pub fn parse_leaf_name(file_name: &str) -> Option<LeafName> {
    let stem = file_name.strip_suffix(".md")?;
    let prefix = stem.get(..10)?;
    let name = stem.get(11..)?;
    let date = NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()?;
    Some(LeafName {
        date,
        name: name.to_string(),
    })
}

/// Strip the date prefix and `.md` extension from a leaf filename.
///
/// Convenience wrapper over [`parse_leaf_name`] for callers that only need
/// the web-facing name.
pub fn normalize_leaf_name(file_name: &str) -> Option<String> {
    parse_leaf_name(file_name).map(|l| l.name)
}

/// Turn a normalized name into a human-readable title.
///
/// Dashes become spaces and each word is title-cased with English rules:
/// first letter uppercased, the rest lowercased. Whitespace is preserved
/// as-is, so `a--b` becomes `A  B`.
pub fn title(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for ch in name.chars() {
        if ch == '-' || ch.is_whitespace() {
            at_word_start = true;
            out.push(if ch == '-' { ' ' } else { ch });
        } else if at_word_start {
            out.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}
