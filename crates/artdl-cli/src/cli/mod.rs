//! CLI for the artdl gallery downloader.

mod progress;
mod prompt;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use artdl_core::config::{self, ArtdlConfig};
use artdl_core::extract::GalleryExtractor;
use artdl_core::http::{CurlClient, HttpOptions};
use artdl_core::pipeline::{Pipeline, PipelineOptions};
use clap::Parser;

pub use prompt::prompt_for_url;

/// Download every image from an artist's gallery.
#[derive(Debug, Parser)]
#[command(name = "artdl")]
#[command(about = "artdl: paginated artist gallery downloader", long_about = None)]
pub struct Cli {
    /// Gallery start URL. Prompted for on stdin when omitted.
    pub url: Option<String>,

    /// Parent directory for artist folders (overrides `output_root`).
    #[arg(long, short = 'o', value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Max concurrent page fetches (overrides `page_concurrency`).
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub pages: Option<u16>,

    /// Max concurrent image downloads (overrides `download_concurrency`).
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub downloads: Option<u16>,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        cli.apply_overrides(&mut cfg);

        let url = match cli.url {
            Some(url) => url,
            None => {
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                prompt_for_url(&mut stdin.lock(), &mut stdout.lock())?
            }
        };

        run_gallery(&cfg, &url).await
    }

    /// Command-line flags win over the config file.
    pub fn apply_overrides(&self, cfg: &mut ArtdlConfig) {
        if let Some(dir) = &self.output {
            cfg.output_root = dir.clone();
        }
        if let Some(n) = self.pages {
            cfg.page_concurrency = usize::from(n);
        }
        if let Some(n) = self.downloads {
            cfg.download_concurrency = usize::from(n);
        }
    }
}

async fn run_gallery(cfg: &ArtdlConfig, url: &str) -> Result<()> {
    let client = Arc::new(CurlClient::new(HttpOptions::from(cfg)));
    let extractor = Arc::new(GalleryExtractor::new().context("building gallery selectors")?);
    let (progress_tx, progress_rx) = tokio::sync::mpsc::channel(64);
    let printer = tokio::spawn(progress::print_events(progress_rx));

    let pipeline = Pipeline::new(PipelineOptions::from(cfg), client.clone(), extractor, client)
        .with_progress(progress_tx);
    let result = pipeline.run(url).await;
    // Closing the channel lets the printer finish.
    drop(pipeline);
    if let Err(e) = printer.await {
        tracing::warn!("progress printer stopped: {}", e);
    }

    let summary = result.with_context(|| format!("gallery run for {url}"))?;
    println!();
    println!("Artist: {} ({})", summary.artist, summary.artist_dir.display());
    println!("Download summary:");
    println!("{}", summary.stats);
    tracing::debug!(
        peak_pages = summary.page_usage.peak,
        peak_downloads = summary.download_usage.peak,
        "gate usage"
    );
    Ok(())
}

#[cfg(test)]
mod tests;
