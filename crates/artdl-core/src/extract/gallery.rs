//! Extractor for the supported gallery layout.
//!
//! - artist name: `span[itemprop="name"]`
//! - article links: `article a[href]`
//! - article title: `h1.post__title`
//! - images: anchors inside `figure`, plus any anchor whose URL has an image extension
//! - pagination: `a.next`, `a[rel~="next"]`, or `menu a[title="Next page"]`

use std::collections::HashSet;

use scraper::{Html, Selector};

use super::{absolutize, ArticleDetail, ExtractionError, Extractor};
use crate::naming::ImageExt;

fn selector(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::Selector {
        css: css.to_string(),
        reason: format!("{:?}", e),
    })
}

/// Parsed selectors for the gallery DOM; build once and share.
#[derive(Debug, Clone)]
pub struct GalleryExtractor {
    artist: Selector,
    article_link: Selector,
    title: Selector,
    figure: Selector,
    figure_link: Selector,
    any_link: Selector,
    next_page: Selector,
}

impl GalleryExtractor {
    pub fn new() -> Result<Self, ExtractionError> {
        Ok(Self {
            artist: selector(r#"span[itemprop="name"]"#)?,
            article_link: selector("article a[href]")?,
            title: selector("h1.post__title")?,
            figure: selector("figure")?,
            figure_link: selector("figure a[href]")?,
            any_link: selector("a[href]")?,
            next_page: selector(r#"a.next[href], a[rel~="next"][href], menu a[title="Next page"][href]"#)?,
        })
    }
}

fn text_of(el: scraper::ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

impl Extractor for GalleryExtractor {
    fn artist_name(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.artist)
            .map(text_of)
            .find(|name| !name.is_empty())
    }

    fn article_urls(&self, html: &str, page_url: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        document
            .select(&self.article_link)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| absolutize(page_url, href))
            .filter(|u| seen.insert(u.clone()))
            .collect()
    }

    fn article_detail(&self, html: &str, page_url: &str) -> Result<ArticleDetail, ExtractionError> {
        let document = Html::parse_document(html);

        if document.select(&self.figure).next().is_none() {
            return Err(ExtractionError::NoImageContainer {
                url: page_url.to_string(),
            });
        }

        let title = document
            .select(&self.title)
            .next()
            .map(text_of)
            .unwrap_or_default();

        let in_figure: HashSet<String> = document
            .select(&self.figure_link)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| absolutize(page_url, href))
            .collect();

        let mut seen = HashSet::new();
        let image_urls = document
            .select(&self.any_link)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| absolutize(page_url, href))
            .filter(|u| in_figure.contains(u) || ImageExt::from_url(u).is_some())
            .filter(|u| seen.insert(u.clone()))
            .collect();

        Ok(ArticleDetail { title, image_urls })
    }

    fn next_page_url(&self, html: &str, page_url: &str) -> Option<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.next_page)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(|href| absolutize(page_url, href))
            .find(|u| u != page_url)
    }
}
