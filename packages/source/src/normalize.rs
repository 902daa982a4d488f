//! Raw row → [`EventRecord`] normalization.
//!
//! Rows without a usable coordinate pair are dropped; nothing else can make
//! a row unusable. Text fields are resolved through [`crate::header::pick`]
//! and then, when that yields nothing, through exact fallback headers.

use event_map_record_models::{EventRecord, RawRow};

use crate::header::pick;
use crate::parsing::parse_coordinate;
use crate::source_def::{FieldMapping, FieldSpec};

/// Number of raw rows logged when a sheet produces no usable rows.
const SAMPLE_ROWS: usize = 3;

/// Why a raw row was dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowSkip {
    /// No header matched a latitude candidate.
    #[error("no latitude column")]
    MissingLatitude,
    /// No header matched a longitude candidate.
    #[error("no longitude column")]
    MissingLongitude,
    /// The latitude cell held no finite number.
    #[error("invalid latitude {0:?}")]
    InvalidLatitude(String),
    /// The longitude cell held no finite number.
    #[error("invalid longitude {0:?}")]
    InvalidLongitude(String),
}

/// Result of normalizing a batch of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizeOutcome {
    /// Usable records, in row order.
    pub records: Vec<EventRecord>,
    /// Number of raw rows that went in.
    pub raw_count: usize,
    /// Number of rows dropped.
    pub skipped: usize,
}

impl NormalizeOutcome {
    /// Rows were fetched but none of them had usable coordinates.
    #[must_use]
    pub fn no_usable_rows(&self) -> bool {
        self.raw_count > 0 && self.records.is_empty()
    }
}

/// Normalizes every row, dropping the ones without usable coordinates.
#[must_use]
pub fn normalize(rows: &[RawRow], fields: &FieldMapping) -> NormalizeOutcome {
    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0;

    for (i, row) in rows.iter().enumerate() {
        match normalize_row(row, fields) {
            Ok(record) => records.push(record),
            Err(reason) => {
                log::debug!("Skipping row {}: {reason}", i + 1);
                skipped += 1;
            }
        }
    }

    log::info!(
        "Normalized {} usable rows (from {})",
        records.len(),
        rows.len()
    );

    let outcome = NormalizeOutcome {
        records,
        raw_count: rows.len(),
        skipped,
    };

    if outcome.no_usable_rows() {
        let sample: Vec<Vec<(&str, &str)>> = rows
            .iter()
            .take(SAMPLE_ROWS)
            .map(|row| row.iter().collect())
            .collect();
        log::warn!(
            "No usable rows: none of {} rows had valid coordinates. Sample: {sample:?}",
            rows.len()
        );
    }

    outcome
}

/// Normalizes a single row.
///
/// # Errors
///
/// Returns [`RowSkip`] when the latitude or longitude is missing or does
/// not parse to a finite number.
pub fn normalize_row(row: &RawRow, fields: &FieldMapping) -> Result<EventRecord, RowSkip> {
    let raw_lat = pick(row, &fields.lat.candidates).ok_or(RowSkip::MissingLatitude)?;
    let raw_lon = pick(row, &fields.lon.candidates).ok_or(RowSkip::MissingLongitude)?;
    let lat =
        parse_coordinate(raw_lat).ok_or_else(|| RowSkip::InvalidLatitude(raw_lat.to_string()))?;
    let lon =
        parse_coordinate(raw_lon).ok_or_else(|| RowSkip::InvalidLongitude(raw_lon.to_string()))?;

    Ok(EventRecord {
        lat,
        lon,
        title: text_field(row, &fields.title),
        category: text_field(row, &fields.category),
        explanation: text_field(row, &fields.explanation),
        location: text_field(row, &fields.location),
        organizer: text_field(row, &fields.organizer),
        building: text_field(row, &fields.building),
        image_url: text_field(row, &fields.image_url),
        start_time: text_field(row, &fields.start_time),
        end_time: text_field(row, &fields.end_time),
        date: text_field(row, &fields.date),
        rain_location: text_field(row, &fields.rain_location),
        rain_building: text_field(row, &fields.rain_building),
        rain_lat: coordinate_field(row, &fields.rain_lat),
        rain_lon: coordinate_field(row, &fields.rain_lon),
    })
}

/// Picked value if non-empty, else the first non-empty fallback header,
/// else `""`.
fn text_field(row: &RawRow, field: &FieldSpec) -> String {
    pick(row, &field.candidates)
        .filter(|v| !v.is_empty())
        .or_else(|| {
            field.fallback_keys
                .iter()
                .filter_map(|key| row.get(key))
                .find(|v| !v.is_empty())
        })
        .unwrap_or_default()
        .to_string()
}

/// Picked value if present, else the first fallback header, parsed as a
/// coordinate.
fn coordinate_field(row: &RawRow, field: &FieldSpec) -> Option<f64> {
    pick(row, &field.candidates)
        .or_else(|| field.fallback_keys.iter().find_map(|key| row.get(key)))
        .and_then(parse_coordinate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells.iter().copied().collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn japanese_headers_produce_record() {
        let r = row(&[("緯度", "35.8"), ("経度", "139.9"), ("名称", "本部")]);
        let record = normalize_row(&r, &FieldMapping::default()).unwrap();
        assert!(close(record.lat, 35.8));
        assert!(close(record.lon, 139.9));
        assert_eq!(record.title, "本部");
        assert_eq!(record.category, "");
        assert_eq!(record.defaulted_category(), "場所");
        assert_eq!(record.rain_lat, None);
        assert_eq!(record.rain_lon, None);
    }

    #[test]
    fn unparseable_latitude_is_skipped() {
        let r = row(&[("緯度", "abc"), ("経度", "139.9")]);
        assert_eq!(
            normalize_row(&r, &FieldMapping::default()),
            Err(RowSkip::InvalidLatitude("abc".to_string()))
        );
    }

    #[test]
    fn missing_longitude_column_is_skipped() {
        let r = row(&[("lat", "35.8"), ("title", "A")]);
        assert_eq!(
            normalize_row(&r, &FieldMapping::default()),
            Err(RowSkip::MissingLongitude)
        );
    }

    #[test]
    fn empty_coordinate_is_invalid() {
        let r = row(&[("lat", ""), ("lon", "139.9")]);
        assert_eq!(
            normalize_row(&r, &FieldMapping::default()),
            Err(RowSkip::InvalidLatitude(String::new()))
        );
    }

    #[test]
    fn comma_decimal_coordinates_are_accepted() {
        let r = row(&[("lat", "35,8"), ("lng", " 139,9 ")]);
        let record = normalize_row(&r, &FieldMapping::default()).unwrap();
        assert!(close(record.lat, 35.8));
        assert!(close(record.lon, 139.9));
    }

    #[test]
    fn rain_coordinates_parse_when_present() {
        let r = row(&[
            ("lat", "35.8"),
            ("lon", "139.9"),
            ("雨天緯度", "35.81"),
            ("雨天経度", "139.91"),
            ("雨天場所", "体育館"),
        ]);
        let record = normalize_row(&r, &FieldMapping::default()).unwrap();
        assert!(close(record.rain_lat.unwrap(), 35.81));
        assert!(close(record.rain_lon.unwrap(), 139.91));
        assert_eq!(record.rain_location, "体育館");
    }

    #[test]
    fn blank_rain_coordinates_are_absent() {
        let r = row(&[
            ("lat", "35.8"),
            ("lon", "139.9"),
            ("rain_lat", ""),
            ("rain_lon", "x"),
        ]);
        let record = normalize_row(&r, &FieldMapping::default()).unwrap();
        assert_eq!(record.rain_lat, None);
        assert_eq!(record.rain_lon, None);
    }

    #[test]
    fn empty_picked_value_falls_back_to_exact_key() {
        let fields = FieldMapping {
            title: FieldSpec {
                candidates: vec!["名称".to_string()],
                fallback_keys: vec!["title".to_string(), "name".to_string()],
            },
            ..FieldMapping::default()
        };
        let r = row(&[
            ("lat", "1"),
            ("lon", "2"),
            ("名称", ""),
            ("title", ""),
            ("name", "Fallback"),
        ]);
        assert_eq!(normalize_row(&r, &fields).unwrap().title, "Fallback");
    }

    #[test]
    fn start_time_uses_camel_case_fallback_key() {
        let fields = FieldMapping {
            start_time: FieldSpec {
                candidates: vec!["開始".to_string()],
                fallback_keys: vec!["startTime".to_string()],
            },
            ..FieldMapping::default()
        };
        let r = row(&[("lat", "1"), ("lon", "2"), ("startTime", "10:00")]);
        assert_eq!(normalize_row(&r, &fields).unwrap().start_time, "10:00");
    }

    #[test]
    fn substring_headers_fill_text_fields() {
        let r = row(&[
            ("lat", "1"),
            ("lon", "2"),
            ("出店カテゴリ", "展示"),
            ("開始時刻 (予定)", "10:00"),
        ]);
        let record = normalize_row(&r, &FieldMapping::default()).unwrap();
        assert_eq!(record.category, "展示");
        assert_eq!(record.start_time, "10:00");
    }

    #[test]
    fn normalize_counts_skips() {
        let rows = vec![
            row(&[("緯度", "35.8"), ("経度", "139.9")]),
            row(&[("緯度", "abc"), ("経度", "139.9")]),
            row(&[("緯度", "35.9"), ("経度", "139.8")]),
        ];
        let outcome = normalize(&rows, &FieldMapping::default());
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.raw_count, 3);
        assert_eq!(outcome.skipped, 1);
        assert!(!outcome.no_usable_rows());
    }

    #[test]
    fn all_rows_unusable_is_flagged() {
        let rows = vec![row(&[("name", "A")]), row(&[("name", "B")])];
        let outcome = normalize(&rows, &FieldMapping::default());
        assert!(outcome.records.is_empty());
        assert!(outcome.no_usable_rows());
    }

    #[test]
    fn empty_input_is_not_flagged_unusable() {
        let outcome = normalize(&[], &FieldMapping::default());
        assert!(!outcome.no_usable_rows());
    }
}
