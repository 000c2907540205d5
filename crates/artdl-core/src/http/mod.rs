//! Page and image transport.
//!
//! The pipeline only depends on the [`PageFetcher`] and [`ByteSource`]
//! traits. [`CurlClient`] implements both over libcurl with bounded connect
//! and total timeouts. Both traits are blocking; the pipeline calls them from
//! `spawn_blocking`.

mod client;
mod parse;

pub use client::{CurlClient, HttpOptions};
pub use parse::ResponseHead;

use crate::retry::FetchError;

/// Body and declared type of a downloaded image.
#[derive(Debug, Clone, Default)]
pub struct Payload {
    pub bytes: Vec<u8>,
    /// `Content-Type` of the final response, if the server sent one.
    pub content_type: Option<String>,
}

/// Fetches the HTML of a gallery or article page.
pub trait PageFetcher: Send + Sync {
    fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches raw image bytes.
pub trait ByteSource: Send + Sync {
    fn get_bytes(&self, url: &str) -> Result<Payload, FetchError>;
}
