//! Ordered fetch chain with a per-attempt timeout.
//!
//! The primary method is tried first. Only if it fails (error, timeout, or
//! cancellation) is the fallback tried, and each is tried at most once.

use std::time::Duration;

use event_map_record_models::RawRow;
use tokio_util::sync::CancellationToken;

use crate::{SourceError, TabularMethod};

/// Rows retrieved by one method of the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedRows {
    /// Label of the method that succeeded.
    pub method: &'static str,
    /// Every data row, in sheet order.
    pub rows: Vec<RawRow>,
}

/// Runs the primary method and, on failure, the fallback.
pub struct SourceFetcher {
    primary: Box<dyn TabularMethod>,
    fallback: Option<Box<dyn TabularMethod>>,
    timeout: Duration,
}

impl SourceFetcher {
    /// Creates a chain with only a primary method.
    #[must_use]
    pub fn new(primary: Box<dyn TabularMethod>, timeout: Duration) -> Self {
        Self {
            primary,
            fallback: None,
            timeout,
        }
    }

    /// Adds the method tried when the primary fails.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Box<dyn TabularMethod>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Fetches the sheet.
    ///
    /// The fallback is never started while the primary attempt is still
    /// outstanding. An empty row set from either method counts as success.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::NoData`] carrying both failure reasons when
    /// every method failed.
    pub async fn fetch(&self) -> Result<FetchedRows, SourceError> {
        let primary_err = match self.attempt(self.primary.as_ref()).await {
            Ok(rows) => return Ok(rows),
            Err(e) => e,
        };

        let Some(fallback) = self.fallback.as_deref() else {
            log::error!(
                "{} failed and no fallback is configured: {primary_err}",
                self.primary.label()
            );
            return Err(SourceError::NoData {
                primary: primary_err.to_string(),
                fallback: "no fallback configured".to_string(),
            });
        };

        log::warn!(
            "{} failed, falling back to {}: {primary_err}",
            self.primary.label(),
            fallback.label()
        );

        match self.attempt(fallback).await {
            Ok(rows) => Ok(rows),
            Err(fallback_err) => {
                log::error!(
                    "All fetch methods failed: {}: {primary_err}; {}: {fallback_err}",
                    self.primary.label(),
                    fallback.label()
                );
                Err(SourceError::NoData {
                    primary: primary_err.to_string(),
                    fallback: fallback_err.to_string(),
                })
            }
        }
    }

    /// Runs one method against the timeout. On expiry the attempt's token
    /// is cancelled so the in-flight request is dropped.
    async fn attempt(&self, method: &dyn TabularMethod) -> Result<FetchedRows, SourceError> {
        let cancel = CancellationToken::new();
        let label = method.label();

        let result = tokio::select! {
            result = method.fetch_rows(&cancel) => result,
            () = tokio::time::sleep(self.timeout) => {
                cancel.cancel();
                Err(SourceError::Timeout {
                    label,
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                })
            }
        };

        let rows = result?;
        log::info!("{label} returned {} rows", rows.len());
        Ok(FetchedRows {
            method: label,
            rows,
        })
    }
}
