//! List-panel entries, list-item hit testing, and map extents.

use event_map_record_models::EventRecord;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::palette::category_color;

/// Two records are at the same spot when both coordinates differ by less
/// than this many degrees.
pub const NEAR_TOLERANCE: f64 = 0.000_01;

/// Title shown for records without one.
pub const UNTITLED: &str = "無題";

/// Shown in place of the list when the view is empty.
pub const EMPTY_LIST_MESSAGE: &str = "場所が見つかりません";

/// Which weather a location line applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "kebab-case")]
pub enum Weather {
    /// Used in fair weather.
    #[strum(serialize = "☀️")]
    Sunny,
    /// Used in any weather.
    #[strum(serialize = "☀️🌧️")]
    SunnyAndRainy,
    /// Used in rainy weather.
    #[strum(serialize = "🌧️")]
    Rainy,
}

/// One location line of a panel entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationLine {
    /// When the location applies.
    pub weather: Weather,
    /// Building and room joined with a space.
    pub text: String,
}

impl std::fmt::Display for LocationLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.weather, self.text)
    }
}

/// Everything the list panel shows for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelEntry {
    /// Title, or [`UNTITLED`].
    pub title: String,
    /// Defaulted category.
    pub category: String,
    /// Category color.
    pub color: &'static str,
    /// Thumbnail path or URL, if any.
    pub image_url: Option<String>,
    /// Sunny and/or rainy location lines, sunny first.
    pub locations: Vec<LocationLine>,
    /// Date, if any.
    pub date: Option<String>,
    /// `"{start} - {end}"` when either is set.
    pub time: Option<String>,
    /// Free-form description, if any.
    pub explanation: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Location lines for `record`.
///
/// The sunny line is marked [`Weather::SunnyAndRainy`] when the rainy
/// location is the same; a separate rainy line appears only when the
/// rainy location is set and differs.
#[must_use]
pub fn location_lines(record: &EventRecord) -> Vec<LocationLine> {
    let sunny = record.sunny_location();
    let rainy = record.rainy_location();
    let mut lines = Vec::new();

    if !sunny.is_empty() {
        let weather = if rainy == sunny {
            Weather::SunnyAndRainy
        } else {
            Weather::Sunny
        };
        lines.push(LocationLine {
            weather,
            text: sunny.clone(),
        });
    }

    if !rainy.is_empty() && rainy != sunny {
        lines.push(LocationLine {
            weather: Weather::Rainy,
            text: rainy,
        });
    }

    lines
}

impl From<&EventRecord> for PanelEntry {
    fn from(record: &EventRecord) -> Self {
        let category = record.defaulted_category();
        let time = (!record.start_time.is_empty() || !record.end_time.is_empty())
            .then(|| format!("{} - {}", record.start_time, record.end_time));

        Self {
            title: non_empty(&record.title).unwrap_or_else(|| UNTITLED.to_string()),
            category: category.to_string(),
            color: category_color(category),
            image_url: non_empty(&record.image_url),
            locations: location_lines(record),
            date: non_empty(&record.date),
            time,
            explanation: non_empty(&record.explanation),
        }
    }
}

/// Panel entries for a list of records, in order.
#[must_use]
pub fn panel_entries(records: &[&EventRecord]) -> Vec<PanelEntry> {
    records.iter().map(|r| PanelEntry::from(*r)).collect()
}

/// Panel heading for the full filtered list.
#[must_use]
pub fn list_heading(count: usize) -> String {
    format!("{count}件の場所が見つかりました")
}

/// Panel heading after a marker was clicked.
#[must_use]
pub fn marker_heading(count: usize) -> String {
    format!("このマーカーに{count}件の場所")
}

/// Records of `view` at (practically) the same spot as `lat`/`lon`.
#[must_use]
pub fn records_near<'a>(view: &[&'a EventRecord], lat: f64, lon: f64) -> Vec<&'a EventRecord> {
    view.iter()
        .copied()
        .filter(|r| (r.lat - lat).abs() < NEAR_TOLERANCE && (r.lon - lon).abs() < NEAR_TOLERANCE)
        .collect()
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl Bounds {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Grows the box to include a point.
    #[must_use]
    pub fn extend(self, lat: f64, lon: f64) -> Self {
        Self {
            west: self.west.min(lon),
            south: self.south.min(lat),
            east: self.east.max(lon),
            north: self.north.max(lat),
        }
    }
}

/// Smallest box containing every record of `view`, or `None` when the
/// view is empty.
#[must_use]
pub fn bounds(view: &[&EventRecord]) -> Option<Bounds> {
    let (first, rest) = view.split_first()?;
    let start = Bounds::new(first.lon, first.lat, first.lon, first.lat);
    Some(rest.iter().fold(start, |b, r| b.extend(r.lat, r.lon)))
}
