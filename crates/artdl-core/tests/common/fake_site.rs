//! In-memory collaborators for pipeline tests that do not need a socket.
//!
//! The "HTML" handed around is just the requested URL, so the extractor can
//! derive everything from it. Both fetchers sleep briefly and track how many
//! calls overlap.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use artdl_core::extract::{ArticleDetail, ExtractionError, Extractor};
use artdl_core::http::{ByteSource, PageFetcher, Payload};
use artdl_core::retry::FetchError;

pub const START: &str = "https://fake.test/artist";

/// Tracks current and peak overlap of calls.
#[derive(Debug, Default)]
pub struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    pub fn enter(&self) -> InFlightGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(self)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct InFlightGuard<'a>(&'a InFlight);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Echoes the URL back as the page body.
#[derive(Debug, Default)]
pub struct EchoFetcher {
    pub in_flight: InFlight,
    pub delay: Duration,
}

impl PageFetcher for EchoFetcher {
    fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let _guard = self.in_flight.enter();
        thread::sleep(self.delay);
        Ok(url.to_string())
    }
}

/// Gallery with `articles` posts of `images` images each, one listing page.
#[derive(Debug, Clone, Copy)]
pub struct FakeSite {
    pub articles: usize,
    pub images: usize,
}

impl Extractor for FakeSite {
    fn artist_name(&self, html: &str) -> Option<String> {
        (html == START).then(|| "Fake Artist".to_string())
    }

    fn article_urls(&self, html: &str, _page_url: &str) -> Vec<String> {
        if html != START {
            return Vec::new();
        }
        (0..self.articles)
            .map(|i| format!("https://fake.test/post/{i}"))
            .collect()
    }

    fn article_detail(&self, html: &str, _page_url: &str) -> Result<ArticleDetail, ExtractionError> {
        let id = html.rsplit('/').next().unwrap_or_default();
        Ok(ArticleDetail {
            title: format!("Post {id}"),
            image_urls: (0..self.images)
                .map(|j| format!("https://fake.test/post/{id}/img{j}.png"))
                .collect(),
        })
    }

    fn next_page_url(&self, _html: &str, _page_url: &str) -> Option<String> {
        None
    }
}

/// What the fake byte source does for every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Serve,
    AlwaysFail,
}

#[derive(Debug)]
pub struct FakeImages {
    pub mode: Mode,
    pub delay: Duration,
    pub in_flight: InFlight,
    calls: Mutex<HashMap<String, usize>>,
}

impl FakeImages {
    pub fn new(mode: Mode, delay: Duration) -> Self {
        Self {
            mode,
            delay,
            in_flight: InFlight::default(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn max_calls_per_url(&self) -> usize {
        self.calls.lock().unwrap().values().copied().max().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl ByteSource for FakeImages {
    fn get_bytes(&self, url: &str) -> Result<Payload, FetchError> {
        let _guard = self.in_flight.enter();
        *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
        thread::sleep(self.delay);
        match self.mode {
            Mode::Serve => Ok(Payload {
                bytes: b"\x89PNG fake".to_vec(),
                content_type: Some("image/png".to_string()),
            }),
            Mode::AlwaysFail => Err(FetchError::Http(503)),
        }
    }
}

/// Serves the start page, but the worker blows up on every article page.
#[derive(Debug, Default)]
pub struct PanicOnArticles;

impl PageFetcher for PanicOnArticles {
    fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        if url == START {
            return Ok(url.to_string());
        }
        panic!("fetch worker crashed on {url}");
    }
}

/// Byte source whose worker panics on every request.
#[derive(Debug, Default)]
pub struct PanickingImages {
    calls: AtomicUsize,
}

impl PanickingImages {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ByteSource for PanickingImages {
    fn get_bytes(&self, url: &str) -> Result<Payload, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        panic!("download worker crashed on {url}");
    }
}
