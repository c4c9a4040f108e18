//! Single-page scraping
//!
//! [`PageScraper`] loads a page with the static-first escalation policy and
//! turns the extracted content into a [`ContentRecord`].

use crate::crawler::fetcher::{FetchMode, Fetcher};
use crate::extract::{normalize_markdown, Classifier, ContentExtractor, ExtractedPage};
use crate::output::ContentRecord;
use crate::url::title_from_url;
use crate::Result;
use std::sync::Arc;
use url::Url;

/// A fetched and extracted page
#[derive(Debug, Clone)]
pub struct LoadedPage {
    /// URL that was requested
    pub url: Url,
    /// URL after redirects, used to resolve relative links
    pub final_url: Url,
    /// Full HTML of the page
    pub html: String,
    pub extracted: ExtractedPage,
    pub mode: FetchMode,
}

/// Loads pages and assembles records
#[derive(Clone)]
pub struct PageScraper {
    fetcher: Fetcher,
    extractor: Arc<ContentExtractor>,
    classifier: Arc<Classifier>,
    min_content_length: usize,
}

impl PageScraper {
    pub fn new(
        fetcher: Fetcher,
        extractor: Arc<ContentExtractor>,
        classifier: Arc<Classifier>,
        min_content_length: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            classifier,
            min_content_length,
        }
    }

    /// Loads a page, escalating to a rendered fetch when needed
    ///
    /// # Escalation
    ///
    /// | Static result | Renderer | Outcome |
    /// |---------------|----------|---------|
    /// | content found | any | static page |
    /// | empty content | none | static page |
    /// | empty content | available | rendered page if it has content, else static page |
    /// | failed | none | `FetchFailed` |
    /// | failed | available | rendered page, or `RenderFailed` |
    pub async fn load(&self, url: &Url) -> Result<LoadedPage> {
        let static_page = match self.fetcher.fetch(url, FetchMode::Static).await {
            Ok(result) => {
                let html = result.text();
                let extracted = self.extractor.extract(&html);
                LoadedPage {
                    url: url.clone(),
                    final_url: result.final_url,
                    html,
                    extracted,
                    mode: FetchMode::Static,
                }
            }
            Err(e) if self.fetcher.can_render() => {
                tracing::debug!("Static fetch failed for {} ({}), rendering", url, e);
                return self.load_rendered(url).await;
            }
            Err(e) => return Err(e),
        };

        if !static_page.extracted.is_empty() || !self.fetcher.can_render() {
            return Ok(static_page);
        }

        tracing::debug!("No content in static HTML of {}, rendering", url);
        match self.load_rendered(url).await {
            Ok(rendered) if !rendered.extracted.is_empty() => Ok(rendered),
            Ok(_) => Ok(static_page),
            Err(e) => {
                tracing::debug!("Render failed for {}: {}", url, e);
                Ok(static_page)
            }
        }
    }

    async fn load_rendered(&self, url: &Url) -> Result<LoadedPage> {
        let result = self.fetcher.fetch(url, FetchMode::Rendered).await?;
        let html = result.text();
        let extracted = self.extractor.extract(&html);

        Ok(LoadedPage {
            url: url.clone(),
            final_url: result.final_url,
            html,
            extracted,
            mode: FetchMode::Rendered,
        })
    }

    /// Builds a record from a loaded page
    ///
    /// Returns `None` when the normalized content is not longer than the
    /// minimum content length.
    pub fn to_record(&self, page: &LoadedPage, user_id: &str) -> Option<ContentRecord> {
        let content = normalize_markdown(&page.extracted.content_html);
        if content.chars().count() <= self.min_content_length {
            tracing::debug!(
                "Skipping {}: {} characters of content",
                page.url,
                content.chars().count()
            );
            return None;
        }

        let title = if page.extracted.title.is_empty() {
            title_from_url(&page.url)
        } else {
            page.extracted.title.clone()
        };

        let content_type = self.classifier.classify(page.url.as_str(), &title);

        Some(ContentRecord {
            title,
            content,
            content_type,
            source_url: page.url.to_string(),
            author: page.extracted.author.clone(),
            user_id: user_id.to_string(),
            chunk_index: None,
            total_chunks: None,
        })
    }

    /// Loads a single page and builds its record
    pub async fn scrape(&self, url: &Url, user_id: &str) -> Result<Option<ContentRecord>> {
        let page = self.load(url).await?;
        tracing::debug!("Loaded {} ({} fetch)", url, page.mode);
        Ok(self.to_record(&page, user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::crawler::delay::Sleeper;
    use crate::crawler::fetcher::FetchSettings;
    use crate::crawler::render::Renderer;
    use crate::extract::ContentType;
    use crate::HarvestError;
    use async_trait::async_trait;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct NoSleep;

    #[async_trait]
    impl Sleeper for NoSleep {
        async fn sleep(&self, _duration: Duration) {}
    }

    struct StaticRenderer(&'static str);

    #[async_trait]
    impl Renderer for StaticRenderer {
        async fn render(&self, _url: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingRenderer;

    #[async_trait]
    impl Renderer for FailingRenderer {
        async fn render(&self, url: &str) -> Result<String> {
            Err(HarvestError::RenderFailed {
                url: url.to_string(),
                reason: "boom".to_string(),
            })
        }
    }

    const ARTICLE: &str = r#"<html><head><title>Fallback title here</title></head><body>
        <article><h1>Writing Async Rust Services</h1>
        <p>Async Rust lets a service juggle thousands of connections on a handful of threads.</p>
        </article></body></html>"#;

    const SHELL: &str = r#"<html><body><div id="root"></div><script>boot()</script></body></html>"#;

    fn scraper(renderer: Option<Arc<dyn Renderer>>) -> PageScraper {
        let config = Config::default();
        let settings = FetchSettings {
            delay: Duration::ZERO,
            max_retries: 1,
            request_timeout: Duration::from_secs(5),
            head_timeout: Duration::from_secs(5),
        };
        let mut fetcher = Fetcher::new(reqwest::Client::new(), settings, Arc::new(NoSleep));
        if let Some(renderer) = renderer {
            fetcher = fetcher.with_renderer(renderer);
        }

        PageScraper::new(
            fetcher,
            Arc::new(ContentExtractor::from_config(&config.selectors, &config.filters).unwrap()),
            Arc::new(Classifier::new(&config.content_type_table())),
            config.filters.min_content_length,
        )
    }

    async fn serve(body: &'static str, status: u16) -> (MockServer, Url) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blog/async-rust"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        let url = Url::parse(&format!("{}/blog/async-rust", server.uri())).unwrap();
        (server, url)
    }

    #[tokio::test]
    async fn test_static_page_to_record() {
        let (_server, url) = serve(ARTICLE, 200).await;
        let record = scraper(None).scrape(&url, "user1").await.unwrap().unwrap();

        assert_eq!(record.title, "Writing Async Rust Services");
        assert_eq!(record.content_type, ContentType::Blog);
        assert!(record.content.starts_with("# Writing Async Rust Services"));
        assert_eq!(record.source_url, url.to_string());
        assert_eq!(record.user_id, "user1");
        assert!(record.chunk_index.is_none());
    }

    #[tokio::test]
    async fn test_escalates_on_empty_content() {
        let (_server, url) = serve(SHELL, 200).await;
        let page = scraper(Some(Arc::new(StaticRenderer(ARTICLE))))
            .load(&url)
            .await
            .unwrap();

        assert_eq!(page.mode, FetchMode::Rendered);
        assert!(!page.extracted.is_empty());
    }

    #[tokio::test]
    async fn test_render_failure_keeps_static_page() {
        let (_server, url) = serve(SHELL, 200).await;
        let page = scraper(Some(Arc::new(FailingRenderer)))
            .load(&url)
            .await
            .unwrap();

        assert_eq!(page.mode, FetchMode::Static);
        assert!(page.extracted.is_empty());
    }

    #[tokio::test]
    async fn test_static_failure_without_renderer() {
        let (_server, url) = serve("", 500).await;
        let err = scraper(None).load(&url).await.unwrap_err();
        assert!(matches!(err, HarvestError::FetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_static_failure_renders() {
        let (_server, url) = serve("", 404).await;
        let page = scraper(Some(Arc::new(StaticRenderer(ARTICLE))))
            .load(&url)
            .await
            .unwrap();
        assert_eq!(page.mode, FetchMode::Rendered);
    }

    #[tokio::test]
    async fn test_short_content_yields_no_record() {
        let (_server, url) = serve("<html><body><p>Too short.</p></body></html>", 200).await;
        assert!(scraper(None).scrape(&url, "user1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_title_falls_back_to_url() {
        let body = "<html><body><main><p>Plenty of body text without any heading element \
                    that would satisfy the title selectors.</p></main></body></html>";
        let (_server, url) = serve(body, 200).await;
        let record = scraper(None).scrape(&url, "user1").await.unwrap().unwrap();

        assert_eq!(record.title, "Async Rust");
    }
}
