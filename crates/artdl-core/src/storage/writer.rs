//! Temp file that becomes the final image on `finalize`.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Open `.part` file for one image. Dropping it without `finalize` closes the
/// handle and removes the temp file.
pub struct PartFile {
    file: Option<File>,
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl PartFile {
    /// Create (or truncate) `<final_path>.part`.
    pub fn create(final_path: &Path) -> io::Result<Self> {
        let temp_path = super::temp_path(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        Ok(PartFile {
            file: Some(file),
            temp_path,
            final_path: final_path.to_path_buf(),
        })
    }

    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        match self.file.as_mut() {
            Some(f) => f.write_all(data),
            None => Err(io::Error::new(io::ErrorKind::Other, "part file already closed")),
        }
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Sync, close, and rename the temp file onto the final path.
    pub fn finalize(mut self) -> io::Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all()?;
        }
        std::fs::rename(&self.temp_path, &self.final_path)
    }
}

impl Drop for PartFile {
    fn drop(&mut self) {
        if self.file.take().is_some() || self.temp_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.temp_path) {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.temp_path.display(), "could not remove temp file: {}", e);
                }
            }
        }
    }
}
