//! Gallery pipeline: discovery, article fan-out, image downloads, retry pass.
//!
//! A run moves through `Init → DiscoverArticles → ProcessArticle* →
//! RetryFailed → Summarize`:
//!
//! - the start page is fetched, the artist name extracted and its folder created
//!   (any failure here aborts the run with [`InitError`]);
//! - listing pages are followed sequentially to collect article URLs;
//! - articles are fetched concurrently under the page lane of the
//!   [`ConcurrencyGate`], titles are resolved in discovery order, and images
//!   are downloaded under the shared download lane;
//! - images that failed once are retried exactly once;
//! - the final [`RunStats`] are returned in a [`RunSummary`].
//!
//! Blocking collaborators (curl, disk) run in `spawn_blocking` while the
//! caller holds the gate permit for that kind of work.

mod article;
mod discover;
mod gate;
mod progress;
mod retry_pass;
mod stats;
mod turns;

pub use gate::{ConcurrencyGate, GatePermit, LaneUsage};
pub use progress::ProgressEvent;
pub use stats::{Attempt, RunStats, StatsSink};

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::ArtdlConfig;
use crate::downloader::{self, ImageTarget, Outcome};
use crate::extract::Extractor;
use crate::http::{ByteSource, PageFetcher};
use crate::naming;
use crate::retry::{run_with_retry, FailedImage, FetchError, RetryLedger, RetryPolicy};

use self::progress::ProgressReporter;
use self::turns::TitleTurns;

/// Used when the configured page retry delay is negative, NaN, or too large.
const DEFAULT_PAGE_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Knobs the orchestrator takes at construction.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Page lane capacity.
    pub page_concurrency: usize,
    /// Download lane capacity, shared by all articles.
    pub download_concurrency: usize,
    /// Artist folders are created under this directory.
    pub output_root: PathBuf,
    /// Retry policy for page fetches (images use the retry ledger instead).
    pub page_retry: RetryPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        PipelineOptions::from(&ArtdlConfig::default())
    }
}

impl From<&ArtdlConfig> for PipelineOptions {
    fn from(cfg: &ArtdlConfig) -> Self {
        let delay = Duration::try_from_secs_f64(cfg.page_retry_delay_secs)
            .unwrap_or(DEFAULT_PAGE_RETRY_DELAY);
        Self {
            page_concurrency: cfg.page_concurrency,
            download_concurrency: cfg.download_concurrency,
            output_root: cfg.output_root.clone(),
            page_retry: RetryPolicy::with_retries(cfg.page_retries, delay),
        }
    }
}

/// Errors that prevent a run from starting. Everything after init is
/// classified per article or per image instead.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("start URL is empty")]
    EmptyUrl,
    #[error("could not fetch start page {url}: {source}")]
    StartPage { url: String, source: FetchError },
    #[error("no artist name found on {url}")]
    MissingArtistName { url: String },
    #[error("could not create artist folder {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub artist: String,
    pub artist_dir: PathBuf,
    pub stats: RunStats,
    pub page_usage: LaneUsage,
    pub download_usage: LaneUsage,
}

/// Orchestrates one gallery download with pluggable collaborators.
#[derive(Clone)]
pub struct Pipeline {
    options: PipelineOptions,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn Extractor>,
    source: Arc<dyn ByteSource>,
    progress_tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl Pipeline {
    pub fn new(
        options: PipelineOptions,
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<dyn Extractor>,
        source: Arc<dyn ByteSource>,
    ) -> Self {
        Self {
            options,
            fetcher,
            extractor,
            source,
            progress_tx: None,
        }
    }

    /// Send [`ProgressEvent`]s to `tx` during runs.
    pub fn with_progress(mut self, tx: mpsc::Sender<ProgressEvent>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    /// Download every image reachable from the gallery at `start_url`.
    ///
    /// Returns `Err` only when the run cannot start; individual article and
    /// image failures are counted in the returned stats.
    pub async fn run(&self, start_url: &str) -> Result<RunSummary, InitError> {
        let start_url = start_url.trim();
        if start_url.is_empty() {
            return Err(InitError::EmptyUrl);
        }
        let ctx = RunContext::new(self);

        let first_html = ctx
            .fetch_page(start_url)
            .await
            .map_err(|e| InitError::StartPage {
                url: start_url.to_string(),
                source: e.into(),
            })?;

        let artist = self
            .extractor
            .artist_name(&first_html)
            .map(|name| naming::sanitize_title(&name))
            .filter(|name| !name.is_empty())
            .ok_or_else(|| InitError::MissingArtistName {
                url: start_url.to_string(),
            })?;
        let artist_dir = self.options.output_root.join(&artist);
        tokio::fs::create_dir_all(&artist_dir)
            .await
            .map_err(|source| InitError::CreateDir {
                path: artist_dir.clone(),
                source,
            })?;
        tracing::info!(artist = %artist, dir = %artist_dir.display(), "artist folder ready");
        ctx.reporter
            .emit(ProgressEvent::ArtistReady {
                name: artist.clone(),
            })
            .await;

        let articles = discover::collect_article_urls(&ctx, start_url, first_html).await;
        ctx.stats.articles_discovered(articles.len());
        ctx.reporter
            .emit(ProgressEvent::ArticlesDiscovered {
                count: articles.len(),
            })
            .await;

        article::process_all(&ctx, &artist_dir, articles).await;
        retry_pass::run(&ctx).await;

        let stats = ctx.stats.snapshot();
        let page_usage = ctx.gate.page_usage();
        let download_usage = ctx.gate.download_usage();
        tracing::info!(
            ok_first = stats.ok_first,
            ok_retry = stats.ok_retry,
            skipped = stats.skipped,
            failed = stats.failed,
            errors = stats.errors,
            peak_pages = page_usage.peak,
            peak_downloads = download_usage.peak,
            "run finished"
        );

        Ok(RunSummary {
            artist,
            artist_dir,
            stats,
            page_usage,
            download_usage,
        })
    }
}

/// Why a page could not be loaded: the site failed, or the worker did.
#[derive(Debug)]
pub(crate) enum PageError {
    Fetch(FetchError),
    /// Fetch task panicked or was cancelled.
    Task(String),
}

impl std::fmt::Display for PageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageError::Fetch(e) => write!(f, "{}", e),
            PageError::Task(msg) => f.write_str(msg),
        }
    }
}

impl From<PageError> for FetchError {
    fn from(e: PageError) -> Self {
        match e {
            PageError::Fetch(e) => e,
            PageError::Task(msg) => FetchError::Other(msg),
        }
    }
}

/// Per-run shared state handed to every article and image task.
#[derive(Clone)]
pub(crate) struct RunContext {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<dyn Extractor>,
    source: Arc<dyn ByteSource>,
    page_retry: RetryPolicy,
    gate: ConcurrencyGate,
    stats: StatsSink,
    ledger: Arc<Mutex<RetryLedger>>,
    turns: Arc<TitleTurns>,
    reporter: ProgressReporter,
}

impl RunContext {
    fn new(pipeline: &Pipeline) -> Self {
        let opts = &pipeline.options;
        Self {
            fetcher: Arc::clone(&pipeline.fetcher),
            extractor: Arc::clone(&pipeline.extractor),
            source: Arc::clone(&pipeline.source),
            page_retry: opts.page_retry,
            gate: ConcurrencyGate::new(opts.page_concurrency, opts.download_concurrency),
            stats: StatsSink::new(),
            ledger: Arc::new(Mutex::new(RetryLedger::new())),
            turns: TitleTurns::new(),
            reporter: ProgressReporter::new(pipeline.progress_tx.clone()),
        }
    }

    fn ledger(&self) -> MutexGuard<'_, RetryLedger> {
        self.ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fetch one page under the page lane, retrying per the page policy.
    async fn fetch_page(&self, url: &str) -> Result<String, PageError> {
        let _permit = self
            .gate
            .acquire_page()
            .await
            .map_err(|e| PageError::Task(format!("page gate closed: {e}")))?;
        let fetcher = Arc::clone(&self.fetcher);
        let policy = self.page_retry;
        let url = url.to_string();
        match tokio::task::spawn_blocking(move || run_with_retry(&policy, || fetcher.fetch_html(&url)))
            .await
        {
            Ok(res) => res.map_err(PageError::Fetch),
            Err(e) => Err(PageError::Task(format!("page fetch task failed: {e}"))),
        }
    }

    /// One download attempt under the download lane.
    async fn download_image(&self, url: String, target: ImageTarget) -> Outcome {
        let _permit = match self.gate.acquire_download().await {
            Ok(p) => p,
            Err(e) => return Outcome::Error(format!("download gate closed: {e}")),
        };
        let source = Arc::clone(&self.source);
        match tokio::task::spawn_blocking(move || downloader::download(source.as_ref(), &url, &target))
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => Outcome::Error(format!("download task failed: {e}")),
        }
    }

    /// Record an attempt's outcome in stats, progress, and (first pass) the ledger.
    async fn settle(&self, attempt: Attempt, seq: usize, image: FailedImage, outcome: Outcome) {
        match &outcome {
            Outcome::Failed(e) if attempt == Attempt::First => {
                tracing::debug!(url = %image.url, error = %e, "queued for retry");
            }
            Outcome::Failed(e) => {
                tracing::warn!(url = %image.url, error = %e, "image failed after retry");
            }
            Outcome::Error(msg) => {
                tracing::error!(url = %image.url, "image worker error: {}", msg);
            }
            Outcome::Success(_) | Outcome::Skipped(_) => {}
        }
        self.stats.record(attempt, &outcome);
        let name = image.target.display_name();
        if attempt == Attempt::First && matches!(outcome, Outcome::Failed(_)) {
            self.ledger().record(seq, image);
        }
        self.reporter.image_finished(attempt, &outcome, name).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_config() {
        let mut cfg = ArtdlConfig::default();
        cfg.page_concurrency = 2;
        cfg.download_concurrency = 5;
        cfg.page_retries = 1;
        cfg.page_retry_delay_secs = 0.25;
        let opts = PipelineOptions::from(&cfg);
        assert_eq!(opts.page_concurrency, 2);
        assert_eq!(opts.download_concurrency, 5);
        assert_eq!(opts.page_retry.max_attempts, 2);
        assert_eq!(opts.page_retry.delay, Duration::from_millis(250));
    }

    #[test]
    fn unrepresentable_retry_delay_falls_back() {
        for delay in [f64::INFINITY, f64::NAN, -3.0, 1e300] {
            let cfg = ArtdlConfig {
                page_retry_delay_secs: delay,
                ..ArtdlConfig::default()
            };
            let opts = PipelineOptions::from(&cfg);
            assert_eq!(opts.page_retry.delay, DEFAULT_PAGE_RETRY_DELAY, "delay {delay}");
        }
    }
}
