//! Run-wide outcome counters.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::downloader::Outcome;

/// Which pass an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retry,
}

/// Final tally for one run. Every discovered image ends up in exactly one of
/// `ok_first`, `ok_retry`, `skipped`, `failed`, `errors`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Stored on the first attempt.
    pub ok_first: usize,
    /// Stored by the retry pass.
    pub ok_retry: usize,
    /// Already on disk.
    pub skipped: usize,
    /// Failed on both attempts.
    pub failed: usize,
    /// Worker died unexpectedly.
    pub errors: usize,
    /// Images found across all processed articles.
    pub images_total: usize,
    /// Article URLs discovered while paginating.
    pub articles_total: usize,
    /// Articles whose images were scheduled.
    pub articles_processed: usize,
    /// Articles whose page could not be fetched.
    pub articles_fetch_failed: usize,
    /// Articles whose page lacked the expected structure.
    pub articles_extraction_failed: usize,
    /// Articles whose task died unexpectedly.
    pub articles_errored: usize,
}

impl RunStats {
    /// Images with a final outcome recorded.
    pub fn accounted(&self) -> usize {
        self.ok_first + self.ok_retry + self.skipped + self.failed + self.errors
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OK_first : {}", self.ok_first)?;
        writeln!(f, "OK_retry : {}", self.ok_retry)?;
        writeln!(f, "SKIP     : {}", self.skipped)?;
        writeln!(f, "FAIL_fin : {}", self.failed)?;
        writeln!(f, "ERR      : {}", self.errors)?;
        write!(
            f,
            "articles : {} found, {} processed, {} unreachable, {} unparsable, {} errored",
            self.articles_total,
            self.articles_processed,
            self.articles_fetch_failed,
            self.articles_extraction_failed,
            self.articles_errored
        )
    }
}

/// Mutex-guarded [`RunStats`] shared by every worker of one run.
#[derive(Debug, Clone, Default)]
pub struct StatsSink {
    inner: Arc<Mutex<RunStats>>,
}

impl StatsSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RunStats> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a final image outcome.
    ///
    /// A first-pass `Failed` is not final (the image goes to the retry
    /// ledger) and is ignored here.
    pub fn record(&self, attempt: Attempt, outcome: &Outcome) {
        let mut s = self.lock();
        match (attempt, outcome) {
            (Attempt::First, Outcome::Success(_)) => s.ok_first += 1,
            (Attempt::Retry, Outcome::Success(_)) => s.ok_retry += 1,
            (_, Outcome::Skipped(_)) => s.skipped += 1,
            (Attempt::First, Outcome::Failed(_)) => {}
            (Attempt::Retry, Outcome::Failed(_)) => s.failed += 1,
            (_, Outcome::Error(_)) => s.errors += 1,
        }
    }

    pub fn articles_discovered(&self, n: usize) {
        self.lock().articles_total += n;
    }

    pub fn article_processed(&self, images: usize) {
        let mut s = self.lock();
        s.articles_processed += 1;
        s.images_total += images;
    }

    pub fn article_fetch_failed(&self) {
        self.lock().articles_fetch_failed += 1;
    }

    pub fn article_extraction_failed(&self) {
        self.lock().articles_extraction_failed += 1;
    }

    pub fn article_errored(&self) {
        self.lock().articles_errored += 1;
    }

    pub fn snapshot(&self) -> RunStats {
        *self.lock()
    }
}
