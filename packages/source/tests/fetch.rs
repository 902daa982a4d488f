//! Integration tests for the values API → export endpoint fetch chain.
//!
//! Uses `wiremock` to stand in for both endpoints so no real network
//! traffic is made.

use std::time::Duration;

use event_map_record_models::LoadSignal;
use event_map_source::SourceError;
use event_map_source::pipeline::load;
use event_map_source::source_def::{SourceDefinition, parse_source_toml};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SPREADSHEET_ID: &str = "sheet-id";
const VALUES_PATH: &str = "/v4/spreadsheets/sheet-id/values/2025map";
const EXPORT_PATH: &str = "/d/sheet-id/gviz/tq";

/// Source pointed at `server` for both methods, with a short timeout.
fn test_source(server: &MockServer, api_key: Option<&str>, timeout_ms: u64) -> SourceDefinition {
    let toml_str = format!(
        r#"
        id = "test"
        name = "Test"
        spreadsheet_id = "{SPREADSHEET_ID}"
        sheet_name = "2025map"
        timeout_ms = {timeout_ms}
        sheets_base_url = "{uri}/v4/spreadsheets"
        export_base_url = "{uri}/d"
        "#,
        uri = server.uri()
    );
    parse_source_toml(&toml_str)
        .expect("valid test source")
        .with_api_key(api_key.map(ToString::to_string))
}

fn values_body() -> serde_json::Value {
    json!({
        "range": "2025map!A1:D3",
        "majorDimension": "ROWS",
        "values": [
            ["緯度", "経度", "title", "category"],
            ["35.833707", "139.955303", "本部", "場所"],
            ["35.8341", "139.9549", "模擬店", "食べ物"]
        ]
    })
}

fn export_body() -> String {
    let payload = json!({
        "version": "0.6",
        "status": "ok",
        "table": {
            "cols": [
                {"id": "A", "label": "lat", "type": "number"},
                {"id": "B", "label": "lon", "type": "number"},
                {"id": "C", "label": "title", "type": "string"}
            ],
            "rows": [
                {"c": [{"v": 35.8}, {"v": 139.9}, {"v": "受付"}]}
            ]
        }
    });
    format!("/*O_o*/\ngoogle.visualization.Query.setResponse({payload});")
}

#[tokio::test]
async fn values_api_success_never_touches_export() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(values_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(EXPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(export_body()))
        .expect(0)
        .mount(&server)
        .await;

    let source = test_source(&server, Some("test-key"), 2_000);
    let fetcher = source.fetcher(&reqwest::Client::new());
    let result = load(&fetcher, &source.fields).await;

    assert_eq!(result.signal, LoadSignal::Ok);
    assert_eq!(result.method, Some("Sheets API"));
    assert_eq!(result.records.len(), 2);
    assert_eq!(result.records[0].title, "本部");
    assert_eq!(result.records[1].category, "食べ物");
}

#[tokio::test]
async fn forbidden_values_api_falls_back_to_export() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(EXPORT_PATH))
        .and(query_param("tqx", "out:json"))
        .and(query_param("sheet", "2025map"))
        .respond_with(ResponseTemplate::new(200).set_body_string(export_body()))
        .expect(1)
        .mount(&server)
        .await;

    let source = test_source(&server, Some("test-key"), 2_000);
    let fetcher = source.fetcher(&reqwest::Client::new());
    let result = load(&fetcher, &source.fields).await;

    assert_eq!(result.signal, LoadSignal::Ok);
    assert_eq!(result.method, Some("export endpoint"));
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].title, "受付");
}

#[tokio::test]
async fn missing_key_goes_straight_to_export() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(values_body()))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(EXPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(export_body()))
        .expect(1)
        .mount(&server)
        .await;

    let source = test_source(&server, None, 2_000);
    let fetcher = source.fetcher(&reqwest::Client::new());
    let result = load(&fetcher, &source.fields).await;

    assert_eq!(result.signal, LoadSignal::Ok);
    assert_eq!(result.method, Some("export endpoint"));
}

#[tokio::test]
async fn both_methods_failing_is_data_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(EXPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>sign in</html>"))
        .mount(&server)
        .await;

    let source = test_source(&server, Some("test-key"), 2_000);
    let fetcher = source.fetcher(&reqwest::Client::new());

    let err = fetcher.fetch().await.unwrap_err();
    assert!(
        matches!(err, SourceError::NoData { .. }),
        "expected NoData, got: {err:?}"
    );

    let result = load(&fetcher, &source.fields).await;
    assert_eq!(result.signal, LoadSignal::DataUnavailable);
    assert!(result.records.is_empty());
}

#[tokio::test]
async fn slow_values_api_times_out_and_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(values_body())
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(EXPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(export_body()))
        .expect(1)
        .mount(&server)
        .await;

    let source = test_source(&server, Some("test-key"), 200);
    let fetcher = source.fetcher(&reqwest::Client::new());
    let fetched = fetcher.fetch().await.expect("fallback should succeed");

    assert_eq!(fetched.method, "export endpoint");
    assert_eq!(fetched.rows.len(), 1);
}

#[tokio::test]
async fn empty_export_table_is_ok_with_no_records() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(EXPORT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "google.visualization.Query.setResponse({\"table\":{\"cols\":[],\"rows\":[]}});",
        ))
        .mount(&server)
        .await;

    let source = test_source(&server, Some("test-key"), 2_000);
    let fetcher = source.fetcher(&reqwest::Client::new());
    let result = load(&fetcher, &source.fields).await;

    assert_eq!(result.signal, LoadSignal::Ok);
    assert!(result.records.is_empty());
}

#[tokio::test]
async fn rows_without_coordinates_are_no_usable_rows() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(VALUES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "values": [["title", "memo"], ["本部", "x"], ["受付", "y"]]
        })))
        .mount(&server)
        .await;

    let source = test_source(&server, Some("test-key"), 2_000);
    let fetcher = source.fetcher(&reqwest::Client::new());
    let result = load(&fetcher, &source.fields).await;

    assert_eq!(result.signal, LoadSignal::NoUsableRows);
    assert_eq!(result.raw_count, 2);
    assert!(result.records.is_empty());
}
