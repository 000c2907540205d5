//! Extractor interface for turning gallery and article HTML into URLs.
//!
//! The pipeline only depends on this trait and does not know about any
//! specific site's DOM. [`GalleryExtractor`] covers the one supported layout.

mod gallery;

pub use gallery::GalleryExtractor;

/// Title and image URLs found on one article page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleDetail {
    /// Raw heading text; empty when the page has none.
    pub title: String,
    /// Absolute image URLs in page order, without duplicates.
    pub image_urls: Vec<String>,
}

/// An article page did not have the structure the extractor expects.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("no image container found on {url}")]
    NoImageContainer { url: String },
    #[error("invalid selector {css:?}: {reason}")]
    Selector { css: String, reason: String },
}

/// Selector-level access to gallery and article pages. Every URL returned is
/// absolute, resolved against `page_url`.
pub trait Extractor: Send + Sync {
    /// Display name of the artist on a gallery page.
    fn artist_name(&self, html: &str) -> Option<String>;

    /// Article links on a gallery listing page, in page order.
    fn article_urls(&self, html: &str, page_url: &str) -> Vec<String>;

    /// Title and image URLs of an article page.
    fn article_detail(&self, html: &str, page_url: &str) -> Result<ArticleDetail, ExtractionError>;

    /// Link to the next listing page, if there is one.
    fn next_page_url(&self, html: &str, page_url: &str) -> Option<String>;
}

/// Resolve `href` against `base`, dropping fragments and non-HTTP schemes.
pub fn absolutize(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let mut joined = match url::Url::parse(base) {
        Ok(b) => b.join(href).ok()?,
        Err(_) => url::Url::parse(href).ok()?,
    };
    if !matches!(joined.scheme(), "http" | "https") {
        return None;
    }
    joined.set_fragment(None);
    Some(joined.to_string())
}
