#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw spreadsheet rows and the canonical event record format.
//!
//! Every spreadsheet source produces [`RawRow`]s keyed by whatever headers
//! the sheet happens to use. The record normalizer turns those into
//! [`EventRecord`]s, the stable shape consumed by filtering, grouping and
//! the presentation layer.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Category substituted wherever a record's category is blank.
pub const DEFAULT_CATEGORY: &str = "場所";

/// Returns the category to use for a raw category value.
///
/// Trims the value and substitutes [`DEFAULT_CATEGORY`] when nothing is
/// left. This is the only place the default is applied.
#[must_use]
pub fn defaulted_category(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        DEFAULT_CATEGORY
    } else {
        trimmed
    }
}

/// One spreadsheet row keyed by its header names.
///
/// Headers keep the order in which they were first inserted. Inserting an
/// existing header replaces its value without moving it, so a sheet with
/// duplicated headers yields the last column's value at the first
/// column's position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self { cells: Vec::new() }
    }

    /// Sets the value for `header`, keeping the header's original position
    /// if it already exists.
    pub fn insert(&mut self, header: impl Into<String>, value: impl Into<String>) {
        let header = header.into();
        let value = value.into();
        if let Some(cell) = self.cells.iter_mut().find(|(h, _)| *h == header) {
            cell.1 = value;
        } else {
            self.cells.push((header, value));
        }
    }

    /// Looks up a value by its exact header name.
    #[must_use]
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(header, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }

    /// Iterates over header names in header order.
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    /// Number of distinct headers in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the row has no headers at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<H: Into<String>, V: Into<String>> FromIterator<(H, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (H, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (header, value) in iter {
            row.insert(header, value);
        }
        row
    }
}

/// A location or event entry normalized to the canonical schema.
///
/// Only rows whose latitude and longitude both parsed to finite numbers
/// become records. Every text field is an empty string when the sheet had
/// nothing for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Latitude (WGS84).
    pub lat: f64,
    /// Longitude (WGS84).
    pub lon: f64,
    /// Display title.
    pub title: String,
    /// Raw category as written in the sheet. Use
    /// [`EventRecord::defaulted_category`] for anything user-facing.
    pub category: String,
    /// Free-form description.
    pub explanation: String,
    /// Room or spot within the building.
    pub location: String,
    /// Organizing group or contact.
    pub organizer: String,
    /// Building name.
    pub building: String,
    /// Thumbnail path or URL.
    pub image_url: String,
    /// Start time, compared as plain text.
    pub start_time: String,
    /// End time, compared as plain text.
    pub end_time: String,
    /// Date, compared as plain text.
    pub date: String,
    /// Room or spot used in rainy weather.
    #[serde(rename = "rain_location")]
    pub rain_location: String,
    /// Building used in rainy weather.
    #[serde(rename = "rain_building")]
    pub rain_building: String,
    /// Latitude of the rainy-weather location, if the sheet had a usable one.
    #[serde(rename = "rain_lat", default, skip_serializing_if = "Option::is_none")]
    pub rain_lat: Option<f64>,
    /// Longitude of the rainy-weather location, if the sheet had a usable one.
    #[serde(rename = "rain_lon", default, skip_serializing_if = "Option::is_none")]
    pub rain_lon: Option<f64>,
}

impl EventRecord {
    /// Creates a record at the given coordinates with every other field
    /// empty.
    #[must_use]
    pub fn at(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            ..Self::default()
        }
    }

    /// The record's category with the default applied.
    #[must_use]
    pub fn defaulted_category(&self) -> &str {
        defaulted_category(&self.category)
    }

    /// Building and location joined with a space, skipping blanks.
    #[must_use]
    pub fn sunny_location(&self) -> String {
        join_non_empty(&[self.building.as_str(), self.location.as_str()])
    }

    /// Rainy-weather building and location joined with a space, skipping
    /// blanks.
    #[must_use]
    pub fn rainy_location(&self) -> String {
        join_non_empty(&[self.rain_building.as_str(), self.rain_location.as_str()])
    }
}

fn join_non_empty(parts: &[&str]) -> String {
    parts
        .iter()
        .copied()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Outcome of a data load that the presentation layer must render
/// distinctly.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum LoadSignal {
    /// Data was fetched and normalized.
    Ok,
    /// Every fetch method failed; the working set is empty.
    DataUnavailable,
    /// Rows were fetched but none had usable coordinates.
    NoUsableRows,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_category_falls_back_to_default() {
        assert_eq!(defaulted_category(""), DEFAULT_CATEGORY);
        assert_eq!(defaulted_category("   "), DEFAULT_CATEGORY);
        assert_eq!(defaulted_category("\u{3000}"), DEFAULT_CATEGORY);
    }

    #[test]
    fn category_is_trimmed() {
        assert_eq!(defaulted_category(" 展示 "), "展示");
    }

    #[test]
    fn duplicate_header_keeps_first_position_and_last_value() {
        let row: RawRow = [("lat", "1"), ("title", "a"), ("lat", "2")]
            .into_iter()
            .collect();
        assert_eq!(row.len(), 2);
        assert_eq!(row.headers().collect::<Vec<_>>(), vec!["lat", "title"]);
        assert_eq!(row.get("lat"), Some("2"));
    }

    #[test]
    fn get_is_exact() {
        let row: RawRow = [("Lat", "1")].into_iter().collect();
        assert_eq!(row.get("lat"), None);
        assert_eq!(row.get("Lat"), Some("1"));
    }

    #[test]
    fn locations_skip_blank_parts() {
        let mut record = EventRecord::at(0.0, 0.0);
        record.location = "101".to_string();
        assert_eq!(record.sunny_location(), "101");
        record.building = "A棟".to_string();
        assert_eq!(record.sunny_location(), "A棟 101");
        assert_eq!(record.rainy_location(), "");
    }

    #[test]
    fn serializes_canonical_field_names() {
        let mut record = EventRecord::at(35.8, 139.9);
        record.image_url = "a.png".to_string();
        record.rain_lat = Some(1.5);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["imageUrl"], "a.png");
        assert_eq!(json["rain_lat"], 1.5);
        assert!(json.get("rain_lon").is_none());
        assert_eq!(json["startTime"], "");
    }

    #[test]
    fn signal_names() {
        assert_eq!(LoadSignal::Ok.to_string(), "ok");
        assert_eq!(LoadSignal::DataUnavailable.to_string(), "data-unavailable");
        assert_eq!(LoadSignal::NoUsableRows.as_ref(), "no-usable-rows");
    }
}
