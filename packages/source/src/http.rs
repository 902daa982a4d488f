//! Single-shot HTTP helper shared by the fetch methods.
//!
//! Each call sends exactly one request. Failures are returned to the
//! fetcher, which decides what to try next.

use tokio_util::sync::CancellationToken;

use crate::SourceError;

/// Maximum number of characters of an error body kept in
/// [`SourceError::HttpStatus`].
const BODY_PREVIEW_LEN: usize = 200;

/// Sends `request` and returns the body as text.
///
/// Resolves to [`SourceError::Cancelled`] as soon as `cancel` fires, dropping
/// the in-flight request.
pub async fn send_text(
    label: &'static str,
    request: reqwest::RequestBuilder,
    cancel: &CancellationToken,
) -> Result<String, SourceError> {
    let exchange = async {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::HttpStatus {
                label,
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        Ok::<_, SourceError>(response.text().await?)
    };

    tokio::select! {
        () = cancel.cancelled() => Err(SourceError::Cancelled { label }),
        result = exchange => result,
    }
}

/// Truncates a body to [`BODY_PREVIEW_LEN`] characters.
fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_LEN).collect()
}
