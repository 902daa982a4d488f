//! Coordinate parsing for locale-variant decimal strings.

use std::sync::LazyLock;

use regex::Regex;

/// Longest leading decimal literal: optional sign, digits with an optional
/// fraction (or a bare fraction), optional exponent.
static DECIMAL_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?").expect("valid regex")
});

/// Parses a coordinate cell.
///
/// Commas are treated as decimal separators (`"35,8"` → 35.8), leading
/// whitespace is skipped, and anything after the leading decimal literal
/// is ignored (`"35.8°"` → 35.8). Returns `None` when there is no literal
/// or the value is not finite.
#[must_use]
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    let normalized = raw.replace(',', ".");
    let literal = DECIMAL_PREFIX_RE.find(normalized.trim_start())?;
    let value = literal.as_str().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}
