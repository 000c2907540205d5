//! libcurl GET client implementing both [`PageFetcher`] and [`ByteSource`].

use std::str;
use std::time::Duration;

use super::parse::{self, ResponseHead};
use super::{ByteSource, PageFetcher, Payload};
use crate::config::ArtdlConfig;
use crate::retry::FetchError;

/// Timeouts and identity for outgoing requests.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    /// Total time allowed for one page GET.
    pub page_timeout: Duration,
    /// Total time allowed for one image GET.
    pub download_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        HttpOptions::from(&ArtdlConfig::default())
    }
}

/// Shortest timeout handed to curl; zero would disable the limit.
const MIN_TIMEOUT: Duration = Duration::from_secs(1);

fn bounded(secs: u64) -> Duration {
    Duration::from_secs(secs).max(MIN_TIMEOUT)
}

impl From<&ArtdlConfig> for HttpOptions {
    fn from(cfg: &ArtdlConfig) -> Self {
        Self {
            connect_timeout: bounded(cfg.connect_timeout_secs),
            page_timeout: bounded(cfg.page_timeout_secs),
            download_timeout: bounded(cfg.download_timeout_secs),
            user_agent: cfg.user_agent.clone(),
        }
    }
}

/// Stateless curl client; each call uses a fresh Easy handle so it is safe to
/// share across blocking worker threads.
#[derive(Debug, Clone, Default)]
pub struct CurlClient {
    opts: HttpOptions,
}

impl CurlClient {
    pub fn new(opts: HttpOptions) -> Self {
        Self { opts }
    }

    /// GET `url`, returning the body and the final response head.
    /// Non-2xx status is an error. Runs in the current thread.
    fn get(&self, url: &str, timeout: Duration) -> Result<(Vec<u8>, ResponseHead), FetchError> {
        let mut body: Vec<u8> = Vec::new();
        let mut headers: Vec<String> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.opts.user_agent)?;
        easy.connect_timeout(self.opts.connect_timeout.max(MIN_TIMEOUT))?;
        easy.timeout(timeout.max(MIN_TIMEOUT))?;

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    headers.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }

        Ok((body, parse::parse_headers(&headers)))
    }
}

impl PageFetcher for CurlClient {
    fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let (body, _) = self.get(url, self.opts.page_timeout)?;
        tracing::debug!(url, bytes = body.len(), "fetched page");
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

impl ByteSource for CurlClient {
    fn get_bytes(&self, url: &str) -> Result<Payload, FetchError> {
        let (bytes, head) = self.get(url, self.opts.download_timeout)?;
        if bytes.is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(Payload {
            bytes,
            content_type: head.content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_follow_config() {
        let mut cfg = ArtdlConfig::default();
        cfg.page_timeout_secs = 7;
        cfg.download_timeout_secs = 9;
        cfg.connect_timeout_secs = 3;
        let opts = HttpOptions::from(&cfg);
        assert_eq!(opts.page_timeout, Duration::from_secs(7));
        assert_eq!(opts.download_timeout, Duration::from_secs(9));
        assert_eq!(opts.connect_timeout, Duration::from_secs(3));
    }

    #[test]
    fn zero_timeouts_stay_bounded() {
        let cfg: ArtdlConfig = toml::from_str(
            "page_timeout_secs = 0\ndownload_timeout_secs = 0\nconnect_timeout_secs = 0",
        )
        .unwrap();
        let opts = HttpOptions::from(&cfg);
        assert_eq!(opts.page_timeout, MIN_TIMEOUT);
        assert_eq!(opts.download_timeout, MIN_TIMEOUT);
        assert_eq!(opts.connect_timeout, MIN_TIMEOUT);
    }

    #[test]
    fn invalid_url_is_fetch_error() {
        let client = CurlClient::default();
        assert!(client.fetch_html("not a url\0").is_err());
    }
}
