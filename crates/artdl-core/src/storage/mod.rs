//! Image files on disk: completeness checks and temp-then-rename writes.
//!
//! Bytes are written to `<target>.part`, synced, then renamed onto the target,
//! so a file at the final path is always complete. A zero-byte file at the
//! target is treated as a leftover and removed.

mod writer;

pub use writer::PartFile;

use std::io;
use std::path::{Path, PathBuf};

use crate::naming::ImageExt;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a_1.png` → `a_1.png.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// True if a non-empty file exists at `path`.
///
/// An empty file is removed and reported as missing so the caller downloads
/// it again.
pub fn is_complete(path: &Path) -> io::Result<bool> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(true),
        Ok(meta) if meta.is_file() => {
            tracing::debug!(path = %path.display(), "removing zero-byte leftover");
            std::fs::remove_file(path)?;
            Ok(false)
        }
        Ok(_) => Ok(false),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// First complete `<dir>/<stem>.<ext>` over every allowed extension.
pub fn find_complete(dir: &Path, stem: &str) -> io::Result<Option<PathBuf>> {
    for ext in ImageExt::ALL {
        let candidate = dir.join(format!("{stem}.{ext}"));
        if is_complete(&candidate)? {
            return Ok(Some(candidate));
        }
    }
    Ok(None)
}

/// Write `bytes` to `final_path` through a `.part` file.
pub fn write_image(final_path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut part = PartFile::create(final_path)?;
    part.write_all(bytes)?;
    part.finalize()
}
