//! Public read-only export endpoint (fallback method).
//!
//! `GET {base}/{spreadsheet_id}/gviz/tq?tqx=out:json&sheet={sheet}` answers
//! with a JSON object wrapped in a callback:
//!
//! ```text
//! /*O_o*/
//! google.visualization.Query.setResponse({"table":{"cols":[...],"rows":[...]}});
//! ```

use std::sync::LazyLock;

use async_trait::async_trait;
use event_map_record_models::RawRow;
use regex::Regex;
use reqwest::Url;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::table::{cell_text, rows_from_table};
use crate::{SourceError, TabularMethod, http};

const LABEL: &str = "export endpoint";

/// Captures the JSON argument of the callback wrapper. The closing
/// parenthesis (and optional semicolon) must end the body.
static WRAPPER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)google\.visualization\.Query\.setResponse\((.*?)\);?$").expect("valid regex")
});

#[derive(Debug, Deserialize)]
struct ExportPayload {
    #[serde(default)]
    table: Option<ExportTable>,
}

#[derive(Debug, Deserialize)]
struct ExportTable {
    #[serde(default)]
    cols: Option<Vec<ExportColumn>>,
    #[serde(default)]
    rows: Option<Vec<ExportRow>>,
}

#[derive(Debug, Deserialize)]
struct ExportColumn {
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

impl ExportColumn {
    /// `label`, then `id`, then `""`, skipping empty values.
    fn name(&self) -> String {
        [self.label.as_deref(), self.id.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or_default()
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ExportRow {
    #[serde(default)]
    c: Option<Vec<Option<ExportCell>>>,
}

#[derive(Debug, Deserialize)]
struct ExportCell {
    #[serde(default)]
    v: serde_json::Value,
}

/// Fallback fetch method: the public export of the same sheet.
pub struct ExportEndpoint {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
}

impl ExportEndpoint {
    /// Creates the method for one sheet of one spreadsheet.
    #[must_use]
    pub const fn new(
        client: reqwest::Client,
        base_url: String,
        spreadsheet_id: String,
        sheet_name: String,
    ) -> Self {
        Self {
            client,
            base_url,
            spreadsheet_id,
            sheet_name,
        }
    }

    /// The export URL for the configured sheet.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`] if the base URL cannot hold path
    /// segments.
    pub fn url(&self) -> Result<Url, SourceError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| SourceError::InvalidUrl {
            url: self.base_url.clone(),
            message: e.to_string(),
        })?;
        url.path_segments_mut()
            .map_err(|()| SourceError::InvalidUrl {
                url: self.base_url.clone(),
                message: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .push(&self.spreadsheet_id)
            .push("gviz")
            .push("tq");
        url.query_pairs_mut()
            .append_pair("tqx", "out:json")
            .append_pair("sheet", &self.sheet_name);
        Ok(url)
    }
}

#[async_trait]
impl TabularMethod for ExportEndpoint {
    fn label(&self) -> &'static str {
        LABEL
    }

    async fn fetch_rows(&self, cancel: &CancellationToken) -> Result<Vec<RawRow>, SourceError> {
        let url = self.url()?;

        log::info!("Fetching {LABEL}: {url}");
        let body = http::send_text(LABEL, self.client.get(url), cancel).await?;

        parse_export(&body)
    }
}

/// Extracts the JSON text from the callback wrapper.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] if the wrapper is not present.
pub fn unwrap_payload(body: &str) -> Result<&str, SourceError> {
    WRAPPER_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| SourceError::Parse {
            label: LABEL,
            message: "unexpected format".to_string(),
        })
}

/// Parses a wrapped export body into rows.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] if the wrapper or the `table` object is
/// missing, and [`SourceError::Json`] if the embedded JSON is malformed.
pub fn parse_export(body: &str) -> Result<Vec<RawRow>, SourceError> {
    let json = unwrap_payload(body)?;
    let payload: ExportPayload = serde_json::from_str(json)?;

    let table = payload.table.ok_or_else(|| SourceError::Parse {
        label: LABEL,
        message: "payload missing table".to_string(),
    })?;

    let headers: Vec<String> = table
        .cols
        .unwrap_or_default()
        .iter()
        .map(ExportColumn::name)
        .collect();

    let rows: Vec<Vec<String>> = table
        .rows
        .unwrap_or_default()
        .iter()
        .map(|row| {
            row.c
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|cell| cell.as_ref().map_or_else(String::new, |c| cell_text(&c.v)))
                .collect()
        })
        .collect();

    Ok(rows_from_table(&headers, &rows))
}
