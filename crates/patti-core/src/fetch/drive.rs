//! Drive v3: media download by file id, PDF lookup by exact name.

use serde::Deserialize;
use std::path::Path;

use super::{direct, FetchError};
use crate::auth::AccessToken;
use crate::http::{HttpClient, HttpError};

const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// Drive API client bound to a base URL and a token.
pub struct DriveClient<'a> {
    http: &'a HttpClient,
    token: &'a AccessToken,
    base: url::Url,
}

impl<'a> DriveClient<'a> {
    pub fn new(http: &'a HttpClient, token: &'a AccessToken, base: &str) -> Result<Self, HttpError> {
        let base = crate::http::validate_url(base)?;
        Ok(Self { http, token, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<url::Url, HttpError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| HttpError::InvalidUrl {
                url: self.base.to_string(),
                reason: "cannot be a base URL".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// URL of the binary content of `file_id`.
    pub fn media_url(&self, file_id: &str) -> Result<url::Url, HttpError> {
        let mut url = self.endpoint(&["files", file_id])?;
        url.query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("supportsAllDrives", "true");
        Ok(url)
    }

    /// Downloads `file_id` into `destination`.
    pub fn download(&self, file_id: &str, destination: &Path) -> Result<u64, FetchError> {
        let url = self.media_url(file_id)?;
        direct::fetch_url(
            self.http,
            url.as_str(),
            &[self.token.bearer_header()],
            destination,
        )
    }

    /// First non-trashed PDF whose name equals `name` exactly.
    ///
    /// Ordering among duplicates is whatever Drive returns first.
    pub fn find_pdf_by_name(&self, name: &str) -> Result<Option<DriveFile>, FetchError> {
        let mut url = self.endpoint(&["files"])?;
        url.query_pairs_mut()
            .append_pair("q", &name_query(name))
            .append_pair("pageSize", "1")
            .append_pair("fields", "files(id,name)")
            .append_pair("supportsAllDrives", "true")
            .append_pair("includeItemsFromAllDrives", "true");

        let resp = self.http.get(&url, &[self.token.bearer_header()])?;
        let list: FileList = serde_json::from_slice(&resp.body)
            .map_err(|e| FetchError::Response(format!("files.list: {}", e)))?;
        Ok(list.files.into_iter().next())
    }
}

/// Drive search expression matching a PDF by exact name.
pub fn name_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        "name = '{}' and mimeType = '{}' and trashed = false",
        escaped, PDF_MIME
    )
}
