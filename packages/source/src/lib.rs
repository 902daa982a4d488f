#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Spreadsheet data sources and normalization into canonical records.
//!
//! Each spreadsheet is described by a [`source_def::SourceDefinition`]
//! embedded from TOML. Rows are retrieved through a chain of
//! [`TabularMethod`]s (the key-authenticated values API first, the public
//! export endpoint second), converted into [`RawRow`]s, and normalized
//! into [`event_map_record_models::EventRecord`]s.

pub mod export;
pub mod fetcher;
pub mod header;
mod http;
pub mod normalize;
pub mod parsing;
pub mod pipeline;
pub mod registry;
pub mod sheets;
pub mod source_def;
pub mod table;

use async_trait::async_trait;
use event_map_record_models::RawRow;
use tokio_util::sync::CancellationToken;

/// Errors that can occur while fetching a spreadsheet.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The attempt did not finish within its time budget.
    #[error("{label} timed out after {timeout_ms}ms")]
    Timeout {
        /// Label of the method that timed out.
        label: &'static str,
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// The endpoint answered with a non-success status.
    #[error("{label} error {status}: {body}")]
    HttpStatus {
        /// Label of the failing method.
        label: &'static str,
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        body: String,
    },

    /// The response did not have the expected shape.
    #[error("{label} parse error: {message}")]
    Parse {
        /// Label of the failing method.
        label: &'static str,
        /// Description of what was wrong with the payload.
        message: String,
    },

    /// The values API answered without any rows.
    #[error("{label} returned no values")]
    EmptyResult {
        /// Label of the failing method.
        label: &'static str,
    },

    /// The attempt observed its cancellation token.
    #[error("{label} request was cancelled")]
    Cancelled {
        /// Label of the cancelled method.
        label: &'static str,
    },

    /// The values API needs a key and none was configured.
    #[error("no API key configured for the Sheets API")]
    MissingApiKey,

    /// A configured base URL could not be turned into a request URL.
    #[error("invalid URL {url}: {message}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        message: String,
    },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Every fetch method failed.
    #[error("no data: primary failed ({primary}); fallback failed ({fallback})")]
    NoData {
        /// Why the primary method failed.
        primary: String,
        /// Why the fallback failed, or why there was none.
        fallback: String,
    },
}

/// One way of retrieving a sheet as rows.
///
/// Implementations must stop work once `cancel` is triggered; the fetcher
/// cancels the token when an attempt exceeds its timeout.
#[async_trait]
pub trait TabularMethod: Send + Sync {
    /// Human-readable name used in logs and errors (e.g. `"Sheets API"`).
    fn label(&self) -> &'static str;

    /// Retrieves the sheet, converting the header row into field names and
    /// every following row into one [`RawRow`].
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on network failure, a non-success status,
    /// an unexpected payload shape, or cancellation.
    async fn fetch_rows(&self, cancel: &CancellationToken) -> Result<Vec<RawRow>, SourceError>;
}
