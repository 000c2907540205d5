//! Progress events for a CLI-friendly live view of a run.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::downloader::Outcome;

use super::stats::Attempt;

/// One step of a run, sent to the optional progress channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Artist resolved and folder ready.
    ArtistReady { name: String },
    /// Pagination finished with this many article URLs.
    ArticlesDiscovered { count: usize },
    /// An image finished one attempt.
    ImageFinished {
        done: usize,
        total: usize,
        attempt: Attempt,
        /// `OK`, `SKIP`, `FAIL`, or `ERR`.
        label: &'static str,
        name: String,
    },
    /// Retry pass starting over this many images.
    RetryStarted { count: usize },
}

/// Sends [`ProgressEvent`]s and keeps the running done/total image counts.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProgressReporter {
    tx: Option<mpsc::Sender<ProgressEvent>>,
    done: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
}

impl ProgressReporter {
    pub(crate) fn new(tx: Option<mpsc::Sender<ProgressEvent>>) -> Self {
        Self {
            tx,
            ..Self::default()
        }
    }

    pub(crate) async fn emit(&self, event: ProgressEvent) {
        if let Some(tx) = &self.tx {
            // Receiver gone means nobody is watching; the run carries on.
            let _ = tx.send(event).await;
        }
    }

    pub(crate) fn add_total(&self, n: usize) {
        self.total.fetch_add(n, Ordering::AcqRel);
    }

    pub(crate) async fn image_finished(&self, attempt: Attempt, outcome: &Outcome, name: String) {
        let done = self.done.fetch_add(1, Ordering::AcqRel) + 1;
        let total = self.total.load(Ordering::Acquire);
        self.emit(ProgressEvent::ImageFinished {
            done,
            total,
            attempt,
            label: outcome.label(),
            name,
        })
        .await;
    }
}
