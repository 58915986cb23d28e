//! Retrieval strategies.
//!
//! Each strategy writes one destination file and reports bytes written or a
//! [`FetchError`]. Strategies never decide fallback order; that belongs to the
//! pipeline. The [`Fetcher`] trait is the seam the pipeline depends on.

pub mod direct;
pub mod drive;
pub mod throttle;

pub use drive::{DriveClient, DriveFile};
pub use throttle::{FixedDelay, NoThrottle, Throttle};

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::auth::AccessToken;
use crate::http::{ErrorKind, HttpClient, HttpError};

/// Why a strategy did not produce a file.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] HttpError),
    /// Filename search returned no PDF with that exact name.
    #[error("no PDF named {0:?} found")]
    NoMatch(String),
    /// The API answered 2xx with a body we could not interpret.
    #[error("unexpected API response: {0}")]
    Response(String),
    #[error("cannot write {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    Finalize(String),
}

impl FetchError {
    pub(crate) fn storage(path: &Path, source: io::Error) -> Self {
        FetchError::Storage {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Coarse cause for logs.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Http(e) => e.kind(),
            FetchError::NoMatch(_) => ErrorKind::NotFound,
            FetchError::Response(_) => ErrorKind::Other,
            FetchError::Storage { .. } | FetchError::Finalize(_) => ErrorKind::Storage,
        }
    }
}

/// The three ways of turning a link into a local file.
pub trait Fetcher {
    /// Download a Drive file by id.
    fn fetch_drive_id(&self, file_id: &str, destination: &Path) -> Result<u64, FetchError>;
    /// Download a plain `http(s)` URL.
    fn fetch_direct(&self, url: &str, destination: &Path) -> Result<u64, FetchError>;
    /// Find a PDF by exact name in Drive, then download it by id.
    fn search_and_fetch(&self, name: &str, destination: &Path) -> Result<u64, FetchError>;
}

/// [`Fetcher`] backed by the Drive API and plain HTTP.
pub struct RemoteFetcher<'a> {
    http: &'a HttpClient,
    drive: DriveClient<'a>,
    throttle: &'a dyn Throttle,
}

impl<'a> RemoteFetcher<'a> {
    pub fn new(
        http: &'a HttpClient,
        token: &'a AccessToken,
        drive_base: &str,
        throttle: &'a dyn Throttle,
    ) -> Result<Self, HttpError> {
        Ok(Self {
            http,
            drive: DriveClient::new(http, token, drive_base)?,
            throttle,
        })
    }
}

impl Fetcher for RemoteFetcher<'_> {
    fn fetch_drive_id(&self, file_id: &str, destination: &Path) -> Result<u64, FetchError> {
        self.drive.download(file_id, destination)
    }

    fn fetch_direct(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        direct::fetch_url(self.http, url, &[], destination)
    }

    fn search_and_fetch(&self, name: &str, destination: &Path) -> Result<u64, FetchError> {
        let file = self
            .drive
            .find_pdf_by_name(name)?
            .ok_or_else(|| FetchError::NoMatch(name.to_string()))?;
        tracing::debug!(name, file_id = %file.id, "filename search matched");
        let written = self.drive.download(&file.id, destination)?;
        self.throttle.after_search();
        Ok(written)
    }
}
