//! Experience slug generation and collision handling.
//!
//! Slugs are derived deterministically from the experience name. When the
//! base slug is already taken, the smallest free numeric suffix (`-1`, `-2`,
//! ...) is appended. The database enforces uniqueness; callers retry on a
//! constraint violation with a fresh set of taken slugs.

use std::collections::HashSet;

/// Slug used when a name contains no sluggable characters at all.
pub const FALLBACK_SLUG: &str = "experience";

/// Maximum slug length, matching the `experiences.slug` column.
pub const MAX_SLUG_LEN: usize = 120;

/// Generate a URL-safe slug from an experience name.
///
/// Transliterates to ASCII and lowercases. ASCII alphanumerics and `_` are
/// kept, runs of whitespace and `-` become a single hyphen, and any other
/// punctuation is dropped. Separators are trimmed from both ends.
pub fn generate_slug(name: &str) -> String {
    let ascii = deunicode::deunicode(name).to_lowercase();
    let mut result = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_hyphen && !result.is_empty() {
                result.push('-');
            }
            pending_hyphen = false;
            result.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_hyphen = true;
        }
    }

    let trimmed = result.trim_matches(|c| c == '-' || c == '_');
    // Leave room for a `-NNNN` suffix.
    let capped: String = trimmed.chars().take(MAX_SLUG_LEN - 8).collect();
    let capped = capped.trim_end_matches(|c| c == '-' || c == '_');

    if capped.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        capped.to_string()
    }
}

/// Return `base` if it is free, otherwise `base-N` with the smallest N >= 1
/// not present in `taken`.
pub fn next_available_slug(base: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}
