//! Article title resolution and per-image filenames.
//!
//! Titles are cleaned with [`sanitize_title`], made unique per artist by
//! [`TitleRegistry`], and combined with a 1-based image index into
//! `<title>_<index>.<ext>` by [`filename_for`].
//!
//! Duplicate titles are disambiguated as `"<title> (N)"` with N counting
//! from 1, skipping any candidate that was already handed out:
//!
//! - `"Update"`, `"Update"`, `"Update"` → `"Update"`, `"Update (1)"`, `"Update (2)"`
//! - `"Update (1)"`, `"Update"`, `"Update"` → `"Update (1)"`, `"Update"`, `"Update (2)"`

mod ext;
mod sanitize;

pub use ext::ImageExt;
pub use sanitize::sanitize_title;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Title used when an article page has no usable heading.
pub const UNTITLED: &str = "untitled";

/// Every title handed out so far for one artist.
#[derive(Debug, Default)]
pub struct TitleRegistry {
    returned: HashSet<String>,
    next_suffix: HashMap<String, usize>,
}

impl TitleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `title` if it has not been returned before, otherwise the first
    /// free `"<title> (N)"`. The returned name is recorded.
    pub fn resolve(&mut self, title: &str) -> String {
        if self.returned.insert(title.to_string()) {
            return title.to_string();
        }
        let mut n = self.next_suffix.get(title).copied().unwrap_or(1);
        loop {
            let candidate = format!("{title} ({n})");
            n += 1;
            if self.returned.insert(candidate.clone()) {
                self.next_suffix.insert(title.to_string(), n);
                return candidate;
            }
        }
    }
}

/// Digits following `/post/` in an article URL, if any.
pub fn post_id(article_url: &str) -> Option<String> {
    let path = url::Url::parse(article_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| article_url.to_string());
    let mut segments = path.split('/');
    segments.find(|s| *s == "post")?;
    let id: String = segments.next()?.chars().take_while(char::is_ascii_digit).collect();
    (!id.is_empty()).then_some(id)
}

/// Clean a raw page title into the base name fed to [`TitleRegistry::resolve`].
///
/// Empty titles become `untitled`; any title starting with `untitled` gets the
/// post id (or discovery sequence when the URL has none) appended so
/// untitled posts stay distinguishable across runs.
pub fn clean_title(raw: &str, article_url: &str, seq: usize) -> String {
    let mut title = sanitize_title(raw);
    if title.is_empty() {
        title = UNTITLED.to_string();
    }
    if title.starts_with(UNTITLED) {
        let id = post_id(article_url).unwrap_or_else(|| seq.to_string());
        title = format!("{title}_{id}");
    }
    title
}

/// `<title>_<index>`: the file stem shared by every extension candidate.
pub fn image_stem(title: &str, index: usize) -> String {
    format!("{title}_{index}")
}

/// `<dir>/<title>_<index>.<ext>`. Pure; distinct (title, index) never collide.
pub fn filename_for(dir: &Path, title: &str, index: usize, ext: ImageExt) -> PathBuf {
    dir.join(format!("{}.{}", image_stem(title, index), ext))
}
