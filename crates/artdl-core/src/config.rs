use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Global configuration loaded from `~/.config/artdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtdlConfig {
    /// Maximum article pages fetched at once.
    pub page_concurrency: usize,
    /// Maximum image downloads in flight at once, across all articles.
    pub download_concurrency: usize,
    /// Root folder; images land in `<output_root>/<artist>/`.
    pub output_root: PathBuf,
    /// Total timeout for one page GET, in seconds.
    pub page_timeout_secs: u64,
    /// Total timeout for one image GET, in seconds.
    pub download_timeout_secs: u64,
    /// Connect timeout for any request, in seconds.
    pub connect_timeout_secs: u64,
    /// Extra attempts for a page fetch that failed with a retryable error.
    pub page_retries: u32,
    /// Pause between page fetch attempts, in seconds (e.g. 0.5 = 500ms).
    pub page_retry_delay_secs: f64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ArtdlConfig {
    fn default() -> Self {
        Self {
            page_concurrency: 3,
            download_concurrency: 10,
            output_root: PathBuf::from("imgs"),
            page_timeout_secs: 30,
            download_timeout_secs: 60,
            connect_timeout_secs: 15,
            page_retries: 2,
            page_retry_delay_secs: 2.0,
            user_agent: concat!("artdl/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ArtdlConfig {
    /// Reject values that would leave a request unbounded or a delay unrepresentable.
    /// Curl treats a zero timeout as "wait forever".
    pub fn validate(&self) -> Result<()> {
        for (key, secs) in [
            ("page_timeout_secs", self.page_timeout_secs),
            ("download_timeout_secs", self.download_timeout_secs),
            ("connect_timeout_secs", self.connect_timeout_secs),
        ] {
            if secs == 0 {
                bail!("{key} must be at least 1");
            }
        }
        let delay = self.page_retry_delay_secs;
        if !delay.is_finite() || delay < 0.0 || Duration::try_from_secs_f64(delay).is_err() {
            bail!("page_retry_delay_secs must be a finite, non-negative number of seconds (got {delay})");
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("artdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ArtdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ArtdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: ArtdlConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
