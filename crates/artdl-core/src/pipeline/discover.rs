//! Sequential pagination over listing pages.

use std::collections::HashSet;

use super::RunContext;

/// Follow next-page links from `start_url` and collect article URLs in
/// order, without duplicates. A listing page that cannot be fetched ends
/// discovery; so does a link back to a page already visited.
pub(super) async fn collect_article_urls(
    ctx: &RunContext,
    start_url: &str,
    first_html: String,
) -> Vec<String> {
    let mut visited = HashSet::from([start_url.to_string()]);
    let mut seen = HashSet::new();
    let mut articles = Vec::new();

    let mut page_url = start_url.to_string();
    let mut html = first_html;
    let mut pages = 1usize;

    loop {
        for url in ctx.extractor.article_urls(&html, &page_url) {
            if seen.insert(url.clone()) {
                articles.push(url);
            }
        }

        let Some(next) = ctx.extractor.next_page_url(&html, &page_url) else {
            break;
        };
        if !visited.insert(next.clone()) {
            tracing::warn!(url = %next, "pagination loops back to a visited page; stopping");
            break;
        }
        match ctx.fetch_page(&next).await {
            Ok(body) => {
                html = body;
                page_url = next;
                pages += 1;
            }
            Err(e) => {
                tracing::warn!(url = %next, error = %e, "listing page unreachable; stopping discovery");
                break;
            }
        }
    }

    tracing::info!(pages, articles = articles.len(), "discovery finished");
    articles
}
