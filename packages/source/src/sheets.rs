//! Key-authenticated spreadsheet values API.
//!
//! `GET {base}/{spreadsheet_id}/values/{sheet}?key={key}` answers with
//! `{"values": [[header...], [cell...], ...]}`. The first row is the header
//! row.

use async_trait::async_trait;
use event_map_record_models::RawRow;
use reqwest::Url;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::table::{cell_text, rows_from_table};
use crate::{SourceError, TabularMethod, http};

const LABEL: &str = "Sheets API";

/// Response body of the values endpoint.
#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Option<Vec<Vec<serde_json::Value>>>,
}

/// Primary fetch method: the values API authenticated by a static key.
pub struct SheetsApi {
    client: reqwest::Client,
    base_url: String,
    spreadsheet_id: String,
    sheet_name: String,
    api_key: Option<String>,
}

impl SheetsApi {
    /// Creates the method for one sheet of one spreadsheet.
    #[must_use]
    pub const fn new(
        client: reqwest::Client,
        base_url: String,
        spreadsheet_id: String,
        sheet_name: String,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url,
            spreadsheet_id,
            sheet_name,
            api_key,
        }
    }

    /// The request URL without the key, with the sheet name encoded as a
    /// path segment.
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
            .push("values")
            .push(&self.sheet_name);
        Ok(url)
    }
}

#[async_trait]
impl TabularMethod for SheetsApi {
    fn label(&self) -> &'static str {
        LABEL
    }

    async fn fetch_rows(&self, cancel: &CancellationToken) -> Result<Vec<RawRow>, SourceError> {
        let key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(SourceError::MissingApiKey)?;
        let url = self.url()?;

        log::info!("Fetching {LABEL}: {url}");
        let request = self.client.get(url).query(&[("key", key)]);
        let body = http::send_text(LABEL, request, cancel).await?;

        parse_values(&body)
    }
}

/// Parses a values response body into rows.
///
/// # Errors
///
/// Returns [`SourceError::Json`] if the body is not valid JSON and
/// [`SourceError::EmptyResult`] if it has no rows at all.
pub fn parse_values(body: &str) -> Result<Vec<RawRow>, SourceError> {
    let response: ValuesResponse = serde_json::from_str(body)?;
    let values = response.values.unwrap_or_default();

    let Some((header_row, data_rows)) = values.split_first() else {
        return Err(SourceError::EmptyResult { label: LABEL });
    };

    let headers: Vec<String> = header_row.iter().map(cell_text).collect();
    let rows: Vec<Vec<String>> = data_rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(rows_from_table(&headers, &rows))
}
