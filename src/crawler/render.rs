//! Rendered fetching through a headless browser
//!
//! [`ChromeRenderer`] owns a single browser process for the whole run.
//! Every render gets its own tab, held in a [`ScopedTab`] so it is closed
//! on success, on error, and when the render future is dropped by a
//! timeout. Concurrent renders never share page state.

use crate::config::RenderConfig;
use crate::crawler::delay::Sleeper;
use crate::{HarvestError, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::future::BoxFuture;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Produces the HTML of a page after its client-side content has loaded
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String>;
}

/// A browser tab that can be closed
pub(crate) trait Tab: Clone + Send + 'static {
    fn close_tab(self) -> BoxFuture<'static, ()>;
}

impl Tab for Page {
    fn close_tab(self) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            if let Err(e) = self.close().await {
                tracing::debug!("Failed to close tab: {}", e);
            }
        })
    }
}

/// Owns a tab for the duration of one render
///
/// [`ScopedTab::close`] closes the tab in place. A guard dropped without
/// being closed (the render future was cancelled) spawns the close on the
/// current runtime instead.
pub(crate) struct ScopedTab<T: Tab> {
    tab: T,
    closed: bool,
}

impl<T: Tab> ScopedTab<T> {
    pub(crate) fn new(tab: T) -> Self {
        Self { tab, closed: false }
    }

    pub(crate) fn tab(&self) -> &T {
        &self.tab
    }

    pub(crate) async fn close(mut self) {
        self.closed = true;
        self.tab.clone().close_tab().await;
    }
}

impl<T: Tab> Drop for ScopedTab<T> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!("Render cancelled, closing its tab in the background");
                handle.spawn(self.tab.clone().close_tab());
            }
            Err(_) => tracing::warn!("Render cancelled outside a runtime; tab left open"),
        }
    }
}

/// Headless Chrome/Chromium renderer
pub struct ChromeRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
    sleeper: Arc<dyn Sleeper>,
    settle_delay: Duration,
}

impl ChromeRenderer {
    /// Launches the browser
    ///
    /// A launch failure is returned as [`HarvestError::Browser`], which callers
    /// treat as fatal for the run. The settle delay after navigation is
    /// waited out through `sleeper`.
    pub async fn launch(
        config: &RenderConfig,
        user_agent: &str,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", user_agent));

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| HarvestError::Browser(format!("invalid browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            HarvestError::Browser(format!(
                "failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser handler event error: {}", e);
                }
            }
        });

        tracing::info!("Headless browser launched");

        Ok(Self {
            browser,
            handler,
            sleeper,
            settle_delay: config.settle_delay(),
        })
    }

    /// Shuts the browser down
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser cleanly: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser process wait failed: {}", e);
        }
    }

    async fn capture(&self, page: &Page) -> std::result::Result<String, String> {
        page.wait_for_navigation()
            .await
            .map_err(|e| format!("navigation failed: {}", e))?;

        self.sleeper.sleep(self.settle_delay).await;

        page.content()
            .await
            .map_err(|e| format!("failed to read page content: {}", e))
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<String> {
        tracing::debug!("Rendering {}", url);

        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| HarvestError::RenderFailed {
                url: url.to_string(),
                reason: format!("failed to open tab: {}", e),
            })?;

        let tab = ScopedTab::new(page);
        let captured = self.capture(tab.tab()).await;
        tab.close().await;

        captured.map_err(|reason| HarvestError::RenderFailed {
            url: url.to_string(),
            reason,
        })
    }
}

impl Drop for ChromeRenderer {
    fn drop(&mut self) {
        self.handler.abort();
    }
}
