use crate::xmltv::dom::{parse_document, DomError, Element};
use futures::StreamExt;
use std::io::Read;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while fetching and parsing one EPG feed.
///
/// Every variant is recoverable at the pipeline level: the feed is logged
/// and skipped, and processing continues with the remaining URLs.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with a status other than 200
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Response body exceeded the configured size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// Gzip decompression of a `.gz` feed body failed
    #[error("Decompression error: {0}")]
    Decompress(std::io::Error),
    /// Feed body could not be parsed as an XMLTV document
    #[error("Parse error: {0}")]
    Parse(#[from] DomError),
}

/// Fetches one EPG feed and parses it into a document tree.
///
/// Issues a single GET with no retry. Only HTTP 200 is accepted. URLs
/// ending in `.gz` have their bodies gzip-decompressed before parsing;
/// everything else is parsed as raw XML.
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    max_size: usize,
) -> Result<Element, FetchError> {
    let response = tokio::time::timeout(timeout, client.get(url).send())
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(FetchError::Network)?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let body = read_limited_bytes(response, max_size).await?;

    let xml = if url.ends_with(".gz") {
        let mut decompressed = Vec::new();
        flate2::read::GzDecoder::new(body.as_slice())
            .read_to_end(&mut decompressed)
            .map_err(FetchError::Decompress)?;
        decompressed
    } else {
        body
    };

    Ok(parse_document(&xml)?)
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
