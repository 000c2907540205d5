//! Per-article record of images that failed their first download attempt.

use std::collections::BTreeMap;

use crate::downloader::ImageTarget;

/// One image that failed its first attempt.
#[derive(Debug, Clone)]
pub struct FailedImage {
    /// 1-based position of the image within its article.
    pub index: usize,
    pub url: String,
    pub target: ImageTarget,
}

/// Failed images grouped by article discovery sequence.
///
/// Keyed by sequence so draining yields articles in discovery order; within an
/// article, images are kept as a set keyed by index.
#[derive(Debug, Default)]
pub struct RetryLedger {
    articles: BTreeMap<usize, BTreeMap<usize, FailedImage>>,
}

impl RetryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failed image for the article with discovery sequence `article_seq`.
    /// Recording the same index twice keeps a single entry.
    pub fn record(&mut self, article_seq: usize, image: FailedImage) {
        self.articles
            .entry(article_seq)
            .or_default()
            .insert(image.index, image);
    }

    /// Total number of failed images across all articles.
    pub fn len(&self) -> usize {
        self.articles.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Number of articles with at least one failed image.
    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    /// Take every recorded failure, leaving the ledger empty.
    pub fn drain(&mut self) -> Vec<(usize, Vec<FailedImage>)> {
        std::mem::take(&mut self.articles)
            .into_iter()
            .map(|(seq, images)| (seq, images.into_values().collect()))
            .collect()
    }
}
