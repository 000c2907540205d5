//! Fetch error type shared by page fetches and image downloads.

use std::fmt;

/// Error returned by a single page fetch or image download.
/// Kept as a concrete enum so failures can be classified before logging.
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
    /// 2xx response without a body; nothing usable to store.
    EmptyBody,
    /// Writing the downloaded bytes to disk failed.
    Storage(std::io::Error),
    /// Failure reported by a non-curl collaborator (e.g. a rendering fetcher).
    Other(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
            FetchError::EmptyBody => write!(f, "empty response body"),
            FetchError::Storage(e) => write!(f, "storage: {}", e),
            FetchError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Storage(e) => Some(e),
            FetchError::Http(_) | FetchError::EmptyBody | FetchError::Other(_) => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Curl(e)
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::Storage(e)
    }
}
