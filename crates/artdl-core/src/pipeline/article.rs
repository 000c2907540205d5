//! Per-article processing: fetch, extract, resolve title, fan out images.

use std::path::{Path, PathBuf};

use tokio::task::JoinSet;

use super::stats::Attempt;
use super::turns::TitleTicket;
use super::{PageError, RunContext};
use crate::downloader::{ImageTarget, Outcome};
use crate::naming::{self, ImageExt};
use crate::retry::FailedImage;

/// Process every article concurrently. Page fetches are bounded by the page
/// lane; titles resolve in `articles` order.
pub(super) async fn process_all(ctx: &RunContext, artist_dir: &Path, articles: Vec<String>) {
    let mut set = JoinSet::new();
    for (seq, url) in articles.into_iter().enumerate() {
        let ctx = ctx.clone();
        let dir = artist_dir.to_path_buf();
        let ticket = ctx.turns.ticket(seq);
        set.spawn(async move { process_article(&ctx, seq, url, dir, ticket).await });
    }

    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            tracing::error!("article task failed: {}", e);
            ctx.stats.article_errored();
        }
    }
}

async fn process_article(
    ctx: &RunContext,
    seq: usize,
    url: String,
    dir: PathBuf,
    ticket: TitleTicket,
) {
    let html = match ctx.fetch_page(&url).await {
        Ok(html) => html,
        Err(PageError::Fetch(e)) => {
            tracing::warn!(url = %url, error = %e, "article page unreachable; skipping its images");
            ctx.stats.article_fetch_failed();
            return;
        }
        Err(PageError::Task(msg)) => {
            tracing::error!(url = %url, "article fetch worker error: {}", msg);
            ctx.stats.article_errored();
            return;
        }
    };

    let detail = match ctx.extractor.article_detail(&html, &url) {
        Ok(detail) => detail,
        Err(e) => {
            tracing::warn!(url = %url, "skipping article: {}", e);
            ctx.stats.article_extraction_failed();
            return;
        }
    };
    drop(html);

    let title = ticket
        .resolve(&naming::clean_title(&detail.title, &url, seq))
        .await;
    let count = detail.image_urls.len();
    ctx.stats.article_processed(count);
    ctx.reporter.add_total(count);
    tracing::debug!(url = %url, title = %title, images = count, "article resolved");

    let mut set = JoinSet::new();
    for (i, image_url) in detail.image_urls.into_iter().enumerate() {
        let index = i + 1;
        let target = ImageTarget::new(dir.clone(), &title, index, ImageExt::from_url(&image_url));
        let ctx = ctx.clone();
        set.spawn(async move {
            let outcome = ctx.download_image(image_url.clone(), target.clone()).await;
            let image = FailedImage {
                index,
                url: image_url,
                target,
            };
            ctx.settle(Attempt::First, seq, image, outcome).await;
        });
    }

    while let Some(res) = set.join_next().await {
        if let Err(e) = res {
            tracing::error!(url = %url, "image task failed: {}", e);
            ctx.stats
                .record(Attempt::First, &Outcome::Error(e.to_string()));
        }
    }
}
