//! Extract acquisition: streamed download of a country's `.osm.pbf`
//! file.
//!
//! The transfer is streamed to disk chunk by chunk with byte progress
//! reported through [`ProgressCallback`]. Only the connect phase is
//! bounded by a timeout; country extracts routinely run to several
//! gigabytes, so the transfer itself is unbounded.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt as _;
use tokio::io::AsyncWriteExt as _;

use crate::FetchError;
use crate::progress::ProgressCallback;

/// Timeout for establishing the HTTP connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// User-Agent sent to extract mirrors (Geofabrik asks for an
/// identifiable client).
const USER_AGENT: &str = "poi-atlas/0.1 (https://github.com/poi-atlas/poi-atlas)";

/// Builds the HTTP client used for extract downloads.
///
/// # Errors
///
/// Returns [`FetchError`] if the client cannot be built.
pub fn build_client() -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .map_err(Into::into)
}

/// Downloads `url` to `dest`, streaming the body to disk.
///
/// Reports the content length (when the server provides one) and each
/// received chunk through `progress`. Any transport or I/O failure
/// aborts the download; a partial file may remain at `dest` and is the
/// caller's responsibility to remove.
///
/// # Errors
///
/// Returns [`FetchError`] if the request fails, the server responds
/// with a non-success status, or the file cannot be written.
pub async fn fetch_extract(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<u64, FetchError> {
    log::info!("Downloading {url} -> {}", dest.display());

    let response = client.get(url).send().await?.error_for_status()?;

    if let Some(total) = response.content_length() {
        progress.set_total(total);
    }

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
        progress.inc(chunk.len() as u64);
    }

    file.flush().await?;

    log::info!("Downloaded {written} bytes to {}", dest.display());
    Ok(written)
}
