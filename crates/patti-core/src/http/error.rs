//! Transport errors and their classification.

use std::io;
use thiserror::Error;

/// Failure of a single HTTP exchange.
#[derive(Debug, Error)]
pub enum HttpError {
    /// URL rejected before any I/O.
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// Response had a non-2xx status. `body` is a short excerpt for diagnostics.
    #[error("HTTP {code} ({})", status_reason(.code))]
    Status { code: u32, body: String },
    /// The body could not be written to its destination.
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
}

/// Coarse cause of an [`HttpError`], used in logs and row outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidUrl,
    Timeout,
    Connection,
    NotFound,
    Unauthorized,
    Throttled,
    /// Any other non-2xx status.
    Http(u16),
    Storage,
    Other,
}

impl HttpError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HttpError::InvalidUrl { .. } => ErrorKind::InvalidUrl,
            HttpError::Curl(e) => classify_curl_error(e),
            HttpError::Status { code, .. } => classify_http_status(*code),
            HttpError::Write(_) => ErrorKind::Storage,
        }
    }
}

/// Classify an HTTP status code.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        401 | 403 => ErrorKind::Unauthorized,
        404 | 410 => ErrorKind::NotFound,
        429 | 503 => ErrorKind::Throttled,
        _ => ErrorKind::Http(code.min(u16::MAX as u32) as u16),
    }
}

/// Classify a curl error.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_url_malformed() || e.is_unsupported_protocol() {
        return ErrorKind::InvalidUrl;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_ssl_connect_error()
    {
        return ErrorKind::Connection;
    }
    if e.is_write_error() {
        return ErrorKind::Storage;
    }
    ErrorKind::Other
}

fn status_reason(code: &u32) -> &'static str {
    match classify_http_status(*code) {
        ErrorKind::Unauthorized => "not authorized",
        ErrorKind::NotFound => "not found",
        ErrorKind::Throttled => "rate limited",
        _ => "unexpected status",
    }
}
