//! Fetch + normalize, producing the records and the load signal shown to
//! users.

use event_map_record_models::{EventRecord, LoadSignal};

use crate::SourceError;
use crate::fetcher::{FetchedRows, SourceFetcher};
use crate::normalize::normalize;
use crate::source_def::FieldMapping;

/// Everything a caller needs after loading one source.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadResult {
    /// Usable records, in sheet order.
    pub records: Vec<EventRecord>,
    /// User-facing outcome of the load.
    pub signal: LoadSignal,
    /// Label of the method that produced the rows, if any did.
    pub method: Option<&'static str>,
    /// Number of rows fetched before normalization.
    pub raw_count: usize,
    /// Number of rows dropped during normalization.
    pub skipped: usize,
}

/// Turns a fetch outcome into a [`LoadResult`].
///
/// A failed fetch becomes [`LoadSignal::DataUnavailable`] with no records.
/// A successful fetch whose rows all lack usable coordinates becomes
/// [`LoadSignal::NoUsableRows`]. Everything else, including an empty
/// sheet, is [`LoadSignal::Ok`].
#[must_use]
pub fn assemble(fetched: Result<FetchedRows, SourceError>, fields: &FieldMapping) -> LoadResult {
    let fetched = match fetched {
        Ok(fetched) => fetched,
        Err(e) => {
            log::error!("Data unavailable: {e}");
            return LoadResult {
                records: Vec::new(),
                signal: LoadSignal::DataUnavailable,
                method: None,
                raw_count: 0,
                skipped: 0,
            };
        }
    };

    let outcome = normalize(&fetched.rows, fields);
    let signal = if outcome.no_usable_rows() {
        LoadSignal::NoUsableRows
    } else {
        LoadSignal::Ok
    };

    LoadResult {
        signal,
        method: Some(fetched.method),
        raw_count: outcome.raw_count,
        skipped: outcome.skipped,
        records: outcome.records,
    }
}

/// Fetches through `fetcher` and normalizes the result.
pub async fn load(fetcher: &SourceFetcher, fields: &FieldMapping) -> LoadResult {
    assemble(fetcher.fetch().await, fields)
}
