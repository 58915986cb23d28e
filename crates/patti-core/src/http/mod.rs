//! Blocking HTTP GET over libcurl.
//!
//! One `Easy` handle per request, bounded connect and read (low-speed)
//! timeouts, redirects followed. Used both for the Google APIs (buffered JSON
//! or media bodies) and for plain direct downloads (streamed).

mod error;

pub use error::{classify_curl_error, classify_http_status, ErrorKind, HttpError};

use crate::config::HttpConfig;
use std::cell::Cell;
use std::io;
use std::str;

/// Bytes of an error body kept for diagnostics.
const ERROR_BODY_EXCERPT: usize = 512;

/// Buffered response of a successful GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

/// Rejects anything that is not an absolute `http(s)` URL.
pub fn validate_url(raw: &str) -> Result<url::Url, HttpError> {
    let parsed = url::Url::parse(raw).map_err(|e| HttpError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" if parsed.host().is_some() => Ok(parsed),
        "http" | "https" => Err(HttpError::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        }),
        other => Err(HttpError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {:?}", other),
        }),
    }
}

/// Shared transfer settings; cheap to copy around by reference.
#[derive(Debug, Clone)]
pub struct HttpClient {
    cfg: HttpConfig,
}

impl HttpClient {
    pub fn new(cfg: HttpConfig) -> Self {
        Self { cfg }
    }

    fn easy(&self, url: &url::Url, headers: &[String]) -> Result<curl::easy::Easy, HttpError> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str())?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.cfg.connect_timeout())?;
        // A transfer slower than 1 B/s for `read_timeout` counts as stalled.
        easy.low_speed_limit(1)?;
        easy.low_speed_time(self.cfg.read_timeout())?;
        easy.buffer_size(self.cfg.chunk_size)?;
        easy.useragent(concat!("patti/", env!("CARGO_PKG_VERSION")))?;

        if !headers.is_empty() {
            let mut list = curl::easy::List::new();
            for h in headers {
                list.append(h.trim())?;
            }
            easy.http_headers(list)?;
        }
        Ok(easy)
    }

    /// GET `url` and buffer the whole body. Non-2xx is an error.
    pub fn get(&self, url: &url::Url, headers: &[String]) -> Result<HttpResponse, HttpError> {
        let mut body = Vec::new();
        let status = self.get_streaming(url, headers, &mut |chunk: &[u8]| {
            body.extend_from_slice(chunk);
            Ok(())
        })?;
        Ok(HttpResponse { status, body })
    }

    /// GET `url`, handing each body chunk of a 2xx response to `sink`.
    ///
    /// Chunks are at most `chunk_size` bytes. Bodies of non-2xx responses
    /// (including redirect hops) never reach `sink`. Returns the final status.
    pub fn get_streaming(
        &self,
        url: &url::Url,
        headers: &[String],
        sink: &mut dyn FnMut(&[u8]) -> io::Result<()>,
    ) -> Result<u32, HttpError> {
        let mut easy = self.easy(url, headers)?;

        let status = Cell::new(0u32);
        let mut error_body: Vec<u8> = Vec::new();
        let mut write_err: Option<io::Error> = None;

        let result = {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(line) = str::from_utf8(data) {
                    if let Some(code) = parse_status_line(line) {
                        status.set(code);
                    }
                }
                true
            })?;
            transfer.write_function(|data| {
                if !is_success(status.get()) {
                    let room = ERROR_BODY_EXCERPT.saturating_sub(error_body.len());
                    error_body.extend_from_slice(&data[..data.len().min(room)]);
                    return Ok(data.len());
                }
                match sink(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        write_err = Some(e);
                        Ok(0) // abort transfer
                    }
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(HttpError::Write(e));
        }
        result?;

        let code = easy.response_code()?;
        if !is_success(code) {
            return Err(HttpError::Status {
                code,
                body: String::from_utf8_lossy(&error_body).into_owned(),
            });
        }
        Ok(code)
    }
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

/// Parses `HTTP/1.1 200 OK` (or `HTTP/2 200`) into the status code.
fn parse_status_line(line: &str) -> Option<u32> {
    let line = line.trim_end();
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}
