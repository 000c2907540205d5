//! Single retry pass over the images recorded in the retry ledger.

use tokio::task::JoinSet;

use super::progress::ProgressEvent;
use super::stats::Attempt;
use super::RunContext;
use crate::downloader::Outcome;

/// Drain the ledger and attempt each failed image once more. Outcomes are
/// final; nothing is re-queued.
pub(super) async fn run(ctx: &RunContext) {
    let (count, articles, drained) = {
        let mut ledger = ctx.ledger();
        (ledger.len(), ledger.article_count(), ledger.drain())
    };
    if count == 0 {
        return;
    }
    tracing::info!(images = count, articles, "retrying failed images");
    ctx.reporter.emit(ProgressEvent::RetryStarted { count }).await;

    let mut set = JoinSet::new();
    for (seq, images) in drained {
        for image in images {
            let ctx = ctx.clone();
            set.spawn(async move {
                let outcome = ctx
                    .download_image(image.url.clone(), image.target.clone())
                    .await;
                ctx.settle(Attempt::Retry, seq, image, outcome).await;
            });
        }
    }

    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            tracing::error!("retry task failed: {}", e);
            ctx.stats.record(Attempt::Retry, &Outcome::Error(e.to_string()));
        }
    }
}
