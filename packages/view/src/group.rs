//! Coordinate grouping for marker aggregation.
//!
//! Records whose latitude and longitude agree to six decimal places share
//! a marker.

use std::collections::BTreeMap;

use event_map_record_models::EventRecord;
use serde::Serialize;

use crate::palette::category_color;

/// Decimal places kept in a coordinate key.
pub const KEY_PRECISION: usize = 6;

/// Records sharing a rounded coordinate, in view order.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateGroup<'a> {
    /// `"{lat},{lon}"` with both rounded to [`KEY_PRECISION`] places.
    pub key: String,
    /// Rounded latitude.
    pub lat: f64,
    /// Rounded longitude.
    pub lon: f64,
    /// Never empty.
    pub records: Vec<&'a EventRecord>,
}

impl CoordinateGroup<'_> {
    /// Number of records at this coordinate.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false` for groups built by [`group`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most frequent defaulted category; ties go to the category
    /// encountered first.
    #[must_use]
    pub fn primary_category(&self) -> &str {
        primary_category(&self.records)
    }
}

/// Fixed-point text with [`KEY_PRECISION`] places. Exact ties round away
/// from zero and negative zero prints as zero, so keys agree with the
/// browser's `toFixed(6)`.
fn round_text(value: f64) -> String {
    let value = if value == 0.0 { 0.0 } else { value };

    if !is_exact_tie(value) {
        return format!("{value:.prec$}", prec = KEY_PRECISION);
    }

    // Ties carry exactly one more digit, always a trailing 5.
    let mut digits = format!("{:.prec$}", value.abs(), prec = KEY_PRECISION + 1).into_bytes();
    digits.pop();
    round_up_digits(&mut digits);

    let text = String::from_utf8(digits).unwrap_or_default();
    if value.is_sign_negative() {
        format!("-{text}")
    } else {
        text
    }
}

/// `true` when `value` lies exactly halfway between two keys.
///
/// A finite binary fraction has as many decimal places as binary ones, so
/// the exact ties at the 7th place are the odd multiples of 2^-7.
fn is_exact_tie(value: f64) -> bool {
    value.is_finite() && (value * 128.0).fract() == 0.0 && (value * 64.0).fract() != 0.0
}

/// Adds one unit in the last place to an ASCII decimal, carrying through
/// the point.
fn round_up_digits(digits: &mut Vec<u8>) {
    for i in (0..digits.len()).rev() {
        match digits[i] {
            b'.' => {}
            b'9' => digits[i] = b'0',
            d => {
                digits[i] = d + 1;
                return;
            }
        }
    }
    digits.insert(0, b'1');
}

/// Grouping key for a coordinate pair.
#[must_use]
pub fn coordinate_key(lat: f64, lon: f64) -> String {
    format!("{},{}", round_text(lat), round_text(lon))
}

/// Groups `records` by [`coordinate_key`], keeping groups in the order
/// their first record appears and records in input order.
#[must_use]
pub fn group<'a>(records: &[&'a EventRecord]) -> Vec<CoordinateGroup<'a>> {
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    let mut groups: Vec<CoordinateGroup<'a>> = Vec::new();

    for &record in records {
        let lat_text = round_text(record.lat);
        let lon_text = round_text(record.lon);
        let key = format!("{lat_text},{lon_text}");

        if let Some(&i) = index.get(&key) {
            groups[i].records.push(record);
            continue;
        }

        index.insert(key.clone(), groups.len());
        groups.push(CoordinateGroup {
            key,
            lat: lat_text.parse().unwrap_or(record.lat),
            lon: lon_text.parse().unwrap_or(record.lon),
            records: vec![record],
        });
    }

    groups
}

/// Most frequent defaulted category among `records`; ties go to the
/// category encountered first. Returns the default category for an empty
/// slice.
#[must_use]
pub fn primary_category<'a>(records: &[&'a EventRecord]) -> &'a str {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for &record in records {
        let category = record.defaulted_category();
        match counts.iter_mut().find(|(c, _)| *c == category) {
            Some((_, n)) => *n += 1,
            None => counts.push((category, 1)),
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for (category, n) in counts {
        if best.is_none_or(|(_, max)| n > max) {
            best = Some((category, n));
        }
    }
    best.map_or(event_map_record_models::DEFAULT_CATEGORY, |(c, _)| c)
}

/// What the map needs to draw one aggregated marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSummary {
    /// Rounded latitude.
    pub lat: f64,
    /// Rounded longitude.
    pub lon: f64,
    /// Number of records at this coordinate.
    pub count: usize,
    /// Category whose color the marker uses.
    pub primary_category: String,
    /// Marker color.
    pub color: &'static str,
    /// Hover text.
    pub tooltip: String,
}

impl From<&CoordinateGroup<'_>> for MarkerSummary {
    fn from(group: &CoordinateGroup<'_>) -> Self {
        let primary = group.primary_category();
        Self {
            lat: group.lat,
            lon: group.lon,
            count: group.len(),
            primary_category: primary.to_string(),
            color: category_color(primary),
            tooltip: format!("{}件の場所", group.len()),
        }
    }
}

/// One marker per group, in group order.
#[must_use]
pub fn markers(groups: &[CoordinateGroup<'_>]) -> Vec<MarkerSummary> {
    groups.iter().map(MarkerSummary::from).collect()
}
