//! Memory content normalization.
//!
//! Extracted and user-edited memory text goes through the same cleanup
//! before persistence: trim, collapse internal whitespace, ensure terminal
//! punctuation. Callers must drop items whose content normalizes to empty.

/// Normalize memory content.
///
/// - Trims leading/trailing whitespace and collapses internal runs of
///   whitespace to a single space.
/// - Whitespace-only input yields the empty string.
/// - Non-empty output always ends in `.`, `!`, or `?` (a period is appended
///   when missing).
///
/// Pure and idempotent: normalizing already-normalized text returns it
/// unchanged.
pub fn normalize_memory_content(content: &str) -> String {
    let normalized = content.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.is_empty() {
        return normalized;
    }
    if normalized.ends_with(['.', '!', '?']) {
        normalized
    } else {
        format!("{normalized}.")
    }
}
