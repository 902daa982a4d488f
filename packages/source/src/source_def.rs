//! Config-driven spreadsheet source definition.
//!
//! [`SourceDefinition`] captures everything unique about one spreadsheet
//! in a serializable config struct: where it lives, how long an attempt
//! may take, and which header names map to which canonical field.

use std::time::Duration;

use serde::Deserialize;

use crate::export::ExportEndpoint;
use crate::fetcher::SourceFetcher;
use crate::sheets::SheetsApi;

/// Time budget for a single fetch attempt.
pub const DEFAULT_TIMEOUT_MS: u64 = 12_000;

/// Base URL of the key-authenticated values API.
pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Base URL of the public export endpoint.
pub const DEFAULT_EXPORT_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

// ── Top-level source definition ──────────────────────────────────────────

/// A complete, config-driven spreadsheet source definition.
///
/// Loaded from TOML files at compile time.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDefinition {
    /// Unique identifier (e.g., `"reitaku_festival_2025"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Spreadsheet document ID.
    pub spreadsheet_id: String,
    /// Sheet (tab) name within the spreadsheet.
    pub sheet_name: String,
    /// Static key for the values API. Without one the values API attempt
    /// fails immediately and the export endpoint is used.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-attempt timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Base URL of the values API.
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,
    /// Base URL of the export endpoint.
    #[serde(default = "default_export_base_url")]
    pub export_base_url: String,
    /// Whether the spreadsheet is published so that the export endpoint
    /// can be used as a fallback.
    #[serde(default = "default_true")]
    pub export_fallback: bool,
    /// Header candidates for each canonical field.
    #[serde(default)]
    pub fields: FieldMapping,
}

const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_sheets_base_url() -> String {
    DEFAULT_SHEETS_BASE_URL.to_string()
}

fn default_export_base_url() -> String {
    DEFAULT_EXPORT_BASE_URL.to_string()
}

const fn default_true() -> bool {
    true
}

impl SourceDefinition {
    /// Returns the unique source identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the human-readable source name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the per-attempt timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Replaces the configured values API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Builds the fetcher: the values API first, then the export endpoint
    /// when [`Self::export_fallback`] is set.
    #[must_use]
    pub fn fetcher(&self, client: &reqwest::Client) -> SourceFetcher {
        let primary = SheetsApi::new(
            client.clone(),
            self.sheets_base_url.clone(),
            self.spreadsheet_id.clone(),
            self.sheet_name.clone(),
            self.api_key.clone(),
        );
        let mut fetcher = SourceFetcher::new(Box::new(primary), self.timeout());
        if self.export_fallback {
            fetcher = fetcher.with_fallback(Box::new(ExportEndpoint::new(
                client.clone(),
                self.export_base_url.clone(),
                self.spreadsheet_id.clone(),
                self.sheet_name.clone(),
            )));
        }
        fetcher
    }
}

// ── Field mapping ────────────────────────────────────────────────────────

/// Header candidates for one canonical field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct FieldSpec {
    /// Header names tried in order by [`crate::header::pick`].
    pub candidates: Vec<String>,
    /// Exact header names consulted when the picked value is missing or
    /// empty.
    #[serde(default)]
    pub fallback_keys: Vec<String>,
}

impl FieldSpec {
    fn new(candidates: &[&str], fallback_keys: &[&str]) -> Self {
        Self {
            candidates: candidates.iter().map(ToString::to_string).collect(),
            fallback_keys: fallback_keys.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Maps sheet headers to canonical record fields.
///
/// Any field left out of a TOML definition keeps its built-in candidates.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    /// Latitude.
    pub lat: FieldSpec,
    /// Longitude.
    pub lon: FieldSpec,
    /// Title.
    pub title: FieldSpec,
    /// Category.
    pub category: FieldSpec,
    /// Explanation.
    pub explanation: FieldSpec,
    /// Date.
    pub date: FieldSpec,
    /// Location.
    pub location: FieldSpec,
    /// Organizer.
    pub organizer: FieldSpec,
    /// Building.
    pub building: FieldSpec,
    /// Image path or URL.
    pub image_url: FieldSpec,
    /// Start time.
    pub start_time: FieldSpec,
    /// End time.
    pub end_time: FieldSpec,
    /// Rainy-weather location.
    pub rain_location: FieldSpec,
    /// Rainy-weather building.
    pub rain_building: FieldSpec,
    /// Rainy-weather latitude.
    pub rain_lat: FieldSpec,
    /// Rainy-weather longitude.
    pub rain_lon: FieldSpec,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            lat: FieldSpec::new(
                &["lat", "latitude", "緯度", "緯度(十進)", "緯度（十進）", "y", "y_lat"],
                &[],
            ),
            lon: FieldSpec::new(
                &[
                    "lon",
                    "lng",
                    "long",
                    "longitude",
                    "経度",
                    "経度(十進)",
                    "経度（十進）",
                    "x",
                    "x_lon",
                ],
                &[],
            ),
            title: FieldSpec::new(
                &["title", "name", "名称", "施設名", "スポット名", "イベント名"],
                &["title", "name"],
            ),
            category: FieldSpec::new(
                &["category", "カテゴリ", "カテゴリー", "種別", "種類"],
                &["category"],
            ),
            explanation: FieldSpec::new(
                &["explanation", "description", "説明", "詳細", "案内"],
                &["explanation"],
            ),
            date: FieldSpec::new(
                &["date", "day", "開催日", "日付", "日", "開催日程"],
                &["date", "day"],
            ),
            location: FieldSpec::new(&["location", "場所", "所在地", "住所"], &["location"]),
            organizer: FieldSpec::new(
                &["organizer", "主催", "担当", "連絡先", "問い合わせ"],
                &["organizer"],
            ),
            building: FieldSpec::new(&["building", "建物", "棟名", "施設"], &["building"]),
            image_url: FieldSpec::new(
                &[
                    "imageurl",
                    "image",
                    "画像",
                    "写真",
                    "thumbnail",
                    "サムネイル",
                    "img",
                ],
                &["imageUrl", "image"],
            ),
            start_time: FieldSpec::new(
                &[
                    "start",
                    "starttime",
                    "start_time",
                    "開始",
                    "開始時刻",
                    "開始時間",
                    "開始日",
                    "開始日時",
                ],
                &["startTime", "start"],
            ),
            end_time: FieldSpec::new(
                &[
                    "end",
                    "endtime",
                    "end_time",
                    "終了",
                    "終了時刻",
                    "終了時間",
                    "終了日",
                    "終了日時",
                ],
                &["endTime", "end"],
            ),
            rain_location: FieldSpec::new(
                &[
                    "rain_location",
                    "雨天場所",
                    "雨天時場所",
                    "雨天会場",
                    "雨天時会場",
                    "雨天移動先",
                    "雨天避難場所",
                ],
                &["rain_location"],
            ),
            rain_building: FieldSpec::new(
                &["rain_building", "雨天建物", "雨天棟名", "雨天施設"],
                &["rain_building"],
            ),
            rain_lat: FieldSpec::new(
                &["rain_lat", "雨天緯度", "雨天緯度(十進)", "雨天緯度（十進）"],
                &["rain_lat"],
            ),
            rain_lon: FieldSpec::new(
                &["rain_lon", "雨天経度", "雨天経度(十進)", "雨天経度（十進）"],
                &["rain_lon"],
            ),
        }
    }
}

/// Parses a [`SourceDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or missing required fields.
pub fn parse_source_toml(toml_str: &str) -> Result<SourceDefinition, String> {
    toml::de::from_str(toml_str).map_err(|e| e.to_string())
}
