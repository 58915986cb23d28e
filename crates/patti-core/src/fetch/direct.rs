//! Plain HTTP(S) download.

use std::path::Path;

use super::FetchError;
use crate::http::{self, HttpClient};
use crate::storage::PartFile;

/// Streams `url` into `destination` through a part file.
///
/// The URL is validated before any I/O; the destination is only replaced
/// once the whole body has arrived with a 2xx status.
pub fn fetch_url(
    client: &HttpClient,
    url: &str,
    headers: &[String],
    destination: &Path,
) -> Result<u64, FetchError> {
    let parsed = http::validate_url(url)?;
    let mut part = PartFile::create(destination).map_err(|e| FetchError::storage(destination, e))?;

    client.get_streaming(&parsed, headers, &mut |chunk: &[u8]| part.write_chunk(chunk))?;

    let written = part
        .finalize()
        .map_err(|e| FetchError::Finalize(format!("{:#}", e)))?;
    tracing::debug!(url, bytes = written, dest = %destination.display(), "direct fetch complete");
    Ok(written)
}
