//! HTTP fetcher implementation
//!
//! This module handles every page request the harvester makes:
//! - Building the shared HTTP client
//! - Static GETs with a politeness delay and linear-backoff retries
//! - Rendered fetches through an optional [`Renderer`]
//! - Lightweight HEAD existence checks used by pagination probing

use crate::config::CrawlerConfig;
use crate::crawler::delay::{linear_backoff, politeness_delay, Sleeper};
use crate::crawler::render::Renderer;
use crate::{HarvestError, Result};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// How a page should be retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain HTTP GET of the server response
    Static,
    /// Page rendered by a headless browser
    Rendered,
}

impl std::fmt::Display for FetchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Rendered => write!(f, "rendered"),
        }
    }
}

/// A successfully fetched response
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value, if any
    pub content_type: Option<String>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl FetchResult {
    /// Returns the body decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Timing and retry settings for the fetcher
#[derive(Debug, Clone)]
pub struct FetchSettings {
    /// Politeness delay upper bound and backoff base
    pub delay: Duration,
    /// Total number of static attempts
    pub max_retries: u32,
    pub request_timeout: Duration,
    pub head_timeout: Duration,
}

impl FetchSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            delay: config.delay(),
            max_retries: config.max_retries.max(1),
            request_timeout: config.request_timeout(),
            head_timeout: config.head_timeout(),
        }
    }
}

/// Builds an HTTP client with the configured user agent and timeouts
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::CrawlerConfig;
/// use sumi_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> std::result::Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages statically or through the renderer
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    renderer: Option<Arc<dyn Renderer>>,
    sleeper: Arc<dyn Sleeper>,
    settings: FetchSettings,
}

impl Fetcher {
    /// Creates a fetcher without rendering support
    pub fn new(client: Client, settings: FetchSettings, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            client,
            renderer: None,
            sleeper,
            settings,
        }
    }

    /// Enables rendered fetches
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Returns true if rendered fetches are available
    pub fn can_render(&self) -> bool {
        self.renderer.is_some()
    }

    /// Fetches a URL in the given mode
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResult)` - A 200 response (static) or rendered HTML
    /// * `Err(HarvestError::FetchFailed)` - Every static attempt failed
    /// * `Err(HarvestError::RenderFailed)` - The single render attempt failed
    pub async fn fetch(&self, url: &Url, mode: FetchMode) -> Result<FetchResult> {
        match mode {
            FetchMode::Static => self.fetch_static(url).await,
            FetchMode::Rendered => self.fetch_rendered(url).await,
        }
    }

    /// Static GET with politeness delay and retry
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 200 | Success |
    /// | Any other status | Retry after `delay * attempt` |
    /// | Network error / timeout | Retry after `delay * attempt` |
    /// | Attempts exhausted | `FetchFailed` |
    async fn fetch_static(&self, url: &Url) -> Result<FetchResult> {
        self.sleeper
            .sleep(politeness_delay(self.settings.delay))
            .await;

        let max_attempts = self.settings.max_retries.max(1);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            tracing::debug!("GET {} (attempt {}/{})", url, attempt, max_attempts);

            match self.get_once(url).await {
                Ok(result) => return Ok(result),
                Err(reason) => {
                    tracing::debug!("Attempt {} for {} failed: {}", attempt, url, reason);
                    last_error = reason;
                }
            }

            if attempt < max_attempts {
                self.sleeper
                    .sleep(linear_backoff(self.settings.delay, attempt))
                    .await;
            }
        }

        Err(HarvestError::FetchFailed {
            url: url.to_string(),
            reason: format!("{} after {} attempts", last_error, max_attempts),
        })
    }

    async fn get_once(&self, url: &Url) -> std::result::Result<FetchResult, String> {
        let response = self
            .client
            .get(url.clone())
            .timeout(self.settings.request_timeout)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(format!("HTTP {}", status.as_u16()));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = response.bytes().await.map_err(|e| e.to_string())?;

        Ok(FetchResult {
            final_url,
            status: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }

    /// Single render attempt bounded by the request timeout
    async fn fetch_rendered(&self, url: &Url) -> Result<FetchResult> {
        let renderer = self
            .renderer
            .as_ref()
            .ok_or_else(|| HarvestError::RenderFailed {
                url: url.to_string(),
                reason: "no renderer configured".to_string(),
            })?;

        let html = tokio::time::timeout(self.settings.request_timeout, renderer.render(url.as_str()))
            .await
            .map_err(|_| HarvestError::RenderFailed {
                url: url.to_string(),
                reason: format!("timed out after {:?}", self.settings.request_timeout),
            })??;

        Ok(FetchResult {
            final_url: url.clone(),
            status: 200,
            content_type: Some("text/html".to_string()),
            body: html.into_bytes(),
        })
    }

    /// HEAD existence check; only a 200 counts as existing
    pub async fn exists(&self, url: &Url) -> bool {
        match self
            .client
            .head(url.clone())
            .timeout(self.settings.head_timeout)
            .send()
            .await
        {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                tracing::debug!("HEAD {} failed: {}", url, e);
                false
            }
        }
    }
}
