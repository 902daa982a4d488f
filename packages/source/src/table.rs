//! Conversion of header-plus-rows tables into [`RawRow`]s.
//!
//! Both fetch methods end up with a list of header names and a list of
//! cell rows; this module is where they become keyed rows.

use event_map_record_models::RawRow;

/// Builds one [`RawRow`] per data row.
///
/// Header `i` maps to cell `i`. Missing cells become `""` and cells past
/// the last header are ignored.
#[must_use]
pub fn rows_from_table(headers: &[String], rows: &[Vec<String>]) -> Vec<RawRow> {
    rows.iter()
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = cells.get(i).map_or("", String::as_str);
                    (header.as_str(), value)
                })
                .collect::<RawRow>()
        })
        .collect()
}

/// Renders a JSON cell value as text.
///
/// Strings pass through, numbers use their shortest form (`35.8`, `139`),
/// booleans become `true`/`false`, and `null` becomes `""`.
#[must_use]
pub fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map_or_else(|| n.to_string(), |f| f.to_string())
            }
        }
        other => other.to_string(),
    }
}
