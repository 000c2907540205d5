//! Download worker: one image URL to one target path.
//!
//! [`download`] never propagates errors. A complete file already on disk is
//! `Skipped` without touching the network; otherwise a single GET either
//! stores the image (`Success`) or yields `Failed` with the cause. `Error`
//! is produced by the pipeline when a worker task dies unexpectedly.

use std::fmt;
use std::path::PathBuf;

use crate::http::ByteSource;
use crate::naming::{self, ImageExt};
use crate::retry::FetchError;
use crate::storage;

/// Where one image goes: `<dir>/<title>_<index>.<ext>`.
///
/// `ext` is `None` when the URL carries no usable extension; the final
/// extension is then chosen from the response `Content-Type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTarget {
    pub dir: PathBuf,
    pub stem: String,
    pub ext: Option<ImageExt>,
}

impl ImageTarget {
    pub fn new(dir: PathBuf, title: &str, index: usize, ext: Option<ImageExt>) -> Self {
        Self {
            dir,
            stem: naming::image_stem(title, index),
            ext,
        }
    }

    /// Path for a concrete extension.
    pub fn path_with(&self, ext: ImageExt) -> PathBuf {
        self.dir.join(format!("{}.{}", self.stem, ext))
    }

    /// Path known before download, if the extension came from the URL.
    pub fn planned_path(&self) -> Option<PathBuf> {
        self.ext.map(|ext| self.path_with(ext))
    }

    /// Complete file already on disk for this image, if any.
    pub fn existing(&self) -> std::io::Result<Option<PathBuf>> {
        match self.planned_path() {
            Some(path) => Ok(storage::is_complete(&path)?.then_some(path)),
            None => storage::find_complete(&self.dir, &self.stem),
        }
    }

    /// Display name used in progress output.
    pub fn display_name(&self) -> String {
        match self.ext {
            Some(ext) => format!("{}.{}", self.stem, ext),
            None => self.stem.clone(),
        }
    }
}

/// Terminal classification of one download attempt.
#[derive(Debug)]
pub enum Outcome {
    /// Image fetched and stored at the path.
    Success(PathBuf),
    /// A complete file was already present; no request was made.
    Skipped(PathBuf),
    /// Network, HTTP, or storage failure.
    Failed(FetchError),
    /// The worker itself broke (panic, cancelled task).
    Error(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success(_) => "OK",
            Outcome::Skipped(_) => "SKIP",
            Outcome::Failed(_) => "FAIL",
            Outcome::Error(_) => "ERR",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success(p) | Outcome::Skipped(p) => {
                write!(f, "{} {}", self.label(), p.display())
            }
            Outcome::Failed(e) => write!(f, "{} {}", self.label(), e),
            Outcome::Error(msg) => write!(f, "{} {}", self.label(), msg),
        }
    }
}

/// Download `url` into `target`. Runs in the current thread; call from
/// `spawn_blocking` if used from async code.
pub fn download(source: &dyn ByteSource, url: &str, target: &ImageTarget) -> Outcome {
    match target.existing() {
        Ok(Some(path)) => {
            tracing::debug!(path = %path.display(), "already downloaded");
            return Outcome::Skipped(path);
        }
        Ok(None) => {}
        Err(e) => return Outcome::Failed(FetchError::Storage(e)),
    }

    let payload = match source.get_bytes(url) {
        Ok(p) if p.bytes.is_empty() => return Outcome::Failed(FetchError::EmptyBody),
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(url, error = %e, "image download failed");
            return Outcome::Failed(e);
        }
    };

    let ext = target
        .ext
        .or_else(|| payload.content_type.as_deref().and_then(ImageExt::from_content_type))
        .unwrap_or(ImageExt::FALLBACK);
    let path = target.path_with(ext);

    match storage::write_image(&path, &payload.bytes) {
        Ok(()) => Outcome::Success(path),
        Err(e) => {
            tracing::warn!(path = %path.display(), "write failed: {}", e);
            Outcome::Failed(FetchError::Storage(e))
        }
    }
}
