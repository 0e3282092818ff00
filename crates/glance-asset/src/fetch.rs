//! Byte fetching for root files and resources missing from the asset map

use crate::handle::ObjectUrls;
use glance_core::{GlanceError, Result};
use std::borrow::Cow;
use std::io::Read;
use std::time::Duration;

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Source of raw bytes for a URL
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

impl<F: Fetcher> Fetcher for &F {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch(url).await
    }
}

/// Fetcher for `http(s)://` URLs, object URLs, `file://` URLs and plain paths
///
/// HTTP requests run on Tokio's blocking pool through `ureq`.
#[derive(Debug, Clone)]
pub struct UrlFetcher {
    timeout: Duration,
    object_urls: ObjectUrls,
}

impl Default for UrlFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
    }
}

impl UrlFetcher {
    /// Create a fetcher with the given HTTP timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            object_urls: ObjectUrls::new(),
        }
    }

    /// Share an object URL table so `blob:` references can be fetched
    pub fn with_object_urls(mut self, object_urls: ObjectUrls) -> Self {
        self.object_urls = object_urls;
        self
    }

    pub fn object_urls(&self) -> &ObjectUrls {
        &self.object_urls
    }
}

impl Fetcher for UrlFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if ObjectUrls::is_object_url(url) {
            log::debug!("Reading object URL {}", url);
            return self
                .object_urls
                .read(url)
                .map(|blob| blob.to_vec())
                .ok_or_else(|| fetch_error(url, "object URL is not live"));
        }

        if url.starts_with("http://") || url.starts_with("https://") {
            log::debug!("Fetching {}", url);
            let owned = url.to_string();
            let timeout = self.timeout;
            return tokio::task::spawn_blocking(move || http_get(&owned, timeout))
                .await
                .map_err(|e| fetch_error(url, e))?;
        }

        let path = url.strip_prefix("file://").unwrap_or(url);
        let path = urlencoding::decode(path).unwrap_or(Cow::Borrowed(path));
        log::debug!("Reading {}", path);
        tokio::fs::read(path.into_owned())
            .await
            .map_err(|e| fetch_error(url, e))
    }
}

fn http_get(url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let agent = build_agent(timeout);
    let response = agent.get(url).call().map_err(|e| fetch_error(url, e))?;

    let mut reader = response.into_body().into_reader();
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| fetch_error(url, e))?;
    Ok(bytes)
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .build();
    config.into()
}

fn fetch_error(url: &str, reason: impl std::fmt::Display) -> GlanceError {
    GlanceError::Fetch {
        url: url.to_string(),
        reason: reason.to_string(),
    }
}
