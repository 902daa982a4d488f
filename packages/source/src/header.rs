//! Header matching for sheets with inconsistent or bilingual headers.
//!
//! A canonical field is resolved from a row by trying an ordered list of
//! candidate header names. Matching is exact first (after trimming and
//! lowercasing both sides) and then loose: the first header, in row order,
//! whose normalized form contains any candidate wins. The loose pass is
//! order-dependent and results must not change between runs, so header
//! order is always the row's own order.

use event_map_record_models::RawRow;

/// Normalized form used for every header comparison.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

/// Resolves one field's value from `row`.
///
/// 1. For each candidate in order, a header whose normalized form equals
///    the normalized candidate. When several headers normalize to the same
///    string, the last of them is used.
/// 2. Otherwise the first header (in row order) whose normalized form
///    contains any normalized candidate.
///
/// Returns `None` when nothing matched, which is distinct from a matched
/// header holding an empty string.
#[must_use]
pub fn pick<'a, S: AsRef<str>>(row: &'a RawRow, candidates: &[S]) -> Option<&'a str> {
    let headers: Vec<(String, &str)> = row
        .iter()
        .map(|(header, value)| (normalize_key(header), value))
        .collect();
    let wanted: Vec<String> = candidates
        .iter()
        .map(|c| normalize_key(c.as_ref()))
        .collect();

    for candidate in &wanted {
        if let Some((_, value)) = headers.iter().rev().find(|(key, _)| key == candidate) {
            return Some(*value);
        }
    }

    headers
        .iter()
        .find(|(key, _)| wanted.iter().any(|c| key.contains(c.as_str())))
        .map(|(_, value)| *value)
}
