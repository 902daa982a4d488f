//! Plain-text rendering of the derived view.

use event_map_record_models::{EventRecord, LoadSignal};
use event_map_view::group::MarkerSummary;
use event_map_view::palette::{CategoryButton, KnownCategory, category_label};
use event_map_view::panel::{
    Bounds, EMPTY_LIST_MESSAGE, PanelEntry, list_heading, marker_heading, panel_entries,
};

const DATA_UNAVAILABLE_BANNER: &str = "データの読み込みに失敗しました。スプレッドシートの公開設定やAPIキーのリファラー制限をご確認ください。";

const NO_USABLE_ROWS_BANNER: &str = "緯度・経度の列が見つからないか数値ではありません。シートのヘッダー（例: lat, lon, 緯度, 経度）と値を確認してください。";

/// Banner text for a load outcome, `None` when everything loaded.
const fn banner(signal: LoadSignal) -> Option<&'static str> {
    match signal {
        LoadSignal::Ok => None,
        LoadSignal::DataUnavailable => Some(DATA_UNAVAILABLE_BANNER),
        LoadSignal::NoUsableRows => Some(NO_USABLE_ROWS_BANNER),
    }
}

pub fn print_banner(signal: LoadSignal) {
    if let Some(text) = banner(signal) {
        println!("⚠️ {text}");
        println!();
    }
}

/// Pretty JSON object carrying the load signal next to `fields`, so an
/// empty result still tells `ok` apart from a failed load.
pub fn json_envelope(
    signal: LoadSignal,
    fields: Vec<(&str, serde_json::Value)>,
) -> Result<String, serde_json::Error> {
    let mut envelope = serde_json::Map::new();
    envelope.insert("signal".to_string(), serde_json::to_value(signal)?);
    for (key, value) in fields {
        envelope.insert(key.to_string(), value);
    }
    serde_json::to_string_pretty(&serde_json::Value::Object(envelope))
}

pub fn print_list(view: &[&EventRecord]) {
    println!("{}", list_heading(view.len()));

    if view.is_empty() {
        println!("{EMPTY_LIST_MESSAGE}");
        return;
    }

    for entry in panel_entries(view) {
        println!();
        print_entry(&entry);
    }
}

fn print_entry(entry: &PanelEntry) {
    println!("{} [{}]", entry.title, entry.category);
    for line in &entry.locations {
        println!("  {line}");
    }
    if let Some(date) = &entry.date {
        println!("  📅 {date}");
    }
    if let Some(time) = &entry.time {
        println!("  ⏰ {time}");
    }
    if let Some(explanation) = &entry.explanation {
        for line in explanation.lines() {
            println!("  {line}");
        }
    }
}

/// Records under one clicked marker.
pub fn print_marker_records(records: &[&EventRecord]) {
    println!("{}", marker_heading(records.len()));

    if records.is_empty() {
        println!("{EMPTY_LIST_MESSAGE}");
        return;
    }

    for entry in panel_entries(records) {
        println!();
        print_entry(&entry);
    }
}

pub fn print_markers(markers: &[MarkerSummary], bounds: Option<Bounds>) {
    println!(
        "{:<12} {:<12} {:>5}  {:<8} CATEGORY",
        "LAT", "LON", "COUNT", "COLOR"
    );
    println!("{}", "-".repeat(60));
    for marker in markers {
        println!(
            "{:<12.6} {:<12.6} {:>5}  {:<8} {}",
            marker.lat, marker.lon, marker.count, marker.color, marker.primary_category
        );
    }
    if let Some(b) = bounds {
        println!();
        println!(
            "Bounds: {:.6},{:.6} to {:.6},{:.6}",
            b.south, b.west, b.north, b.east
        );
    }
}

pub fn print_palette() {
    for category in KnownCategory::all() {
        println!("{:<8} {} ({})", category.color(), category, category.label());
    }
}

pub fn print_categories(buttons: &[CategoryButton]) {
    for button in buttons {
        match button.category.as_deref().map(category_label) {
            Some(label) if label != button.text => {
                println!("{:<8} {} ({label})", button.color, button.text);
            }
            _ => println!("{:<8} {}", button.color, button.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_has_no_banner() {
        assert_eq!(banner(LoadSignal::Ok), None);
    }

    #[test]
    fn failure_signals_have_distinct_banners() {
        let unavailable = banner(LoadSignal::DataUnavailable).unwrap();
        let unusable = banner(LoadSignal::NoUsableRows).unwrap();
        assert_ne!(unavailable, unusable);
        assert!(unusable.contains("緯度"));
    }

    #[test]
    fn json_envelope_keeps_signal_for_empty_results() {
        let records: Vec<&EventRecord> = Vec::new();
        let empty = serde_json::to_value(&records).unwrap();

        let failed = json_envelope(
            LoadSignal::DataUnavailable,
            vec![("records", empty.clone())],
        )
        .unwrap();
        let loaded = json_envelope(LoadSignal::Ok, vec![("records", empty)]).unwrap();
        assert_ne!(failed, loaded);

        let failed: serde_json::Value = serde_json::from_str(&failed).unwrap();
        assert_eq!(failed["signal"], "data-unavailable");
        assert_eq!(failed["records"], serde_json::json!([]));
    }

    #[test]
    fn json_envelope_carries_every_field() {
        let text = json_envelope(
            LoadSignal::NoUsableRows,
            vec![
                ("markers", serde_json::json!([])),
                ("bounds", serde_json::Value::Null),
            ],
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["signal"], "no-usable-rows");
        assert_eq!(value["markers"], serde_json::json!([]));
        assert!(value["bounds"].is_null());
    }
}
