//! Brand identity normalization.
//!
//! [`normalize`] is the single source of truth for brand join keys. It is
//! applied to brand table names, source names, and explicit brand columns
//! alike; using anything else on either side of the join breaks matching
//! silently.

/// Derive the canonical join key for a raw brand name.
///
/// Trims, lowercases, spells `+` as `plus`, and removes all whitespace.
/// Total and pure: empty input gives an empty key.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace('+', "plus")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Human-facing form of a brand name: trimmed, interior whitespace runs
/// collapsed to a single space. Casing is preserved.
pub fn display_name(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
