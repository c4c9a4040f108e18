//! Shared fixtures for the integration tests

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use sumi_harvest::config::Config;
use sumi_harvest::crawler::{
    build_http_client, FetchSettings, Fetcher, PageScraper, Scheduler, Sleeper,
};
use sumi_harvest::extract::{Classifier, ContentExtractor};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Sleeper that returns immediately
pub struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

/// Default configuration with delays and rendering turned off
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.crawler.delay = 0.0;
    config.crawler.request_timeout = 5;
    config.crawler.head_timeout = 5;
    config.render.enabled = false;
    config
}

pub fn fetcher(config: &Config) -> Fetcher {
    let client = build_http_client(&config.crawler).unwrap();
    Fetcher::new(
        client,
        FetchSettings::from_config(&config.crawler),
        Arc::new(NoSleep),
    )
}

pub fn scheduler(config: &Config) -> Scheduler {
    let scraper = PageScraper::new(
        fetcher(config),
        Arc::new(ContentExtractor::from_config(&config.selectors, &config.filters).unwrap()),
        Arc::new(Classifier::new(&config.content_type_table())),
        config.filters.min_content_length,
    );
    Scheduler::new(scraper, &config.crawler, &config.filters.skip_url_patterns)
}

/// An article page with the given title and links
pub fn article(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<li><a href="{}">{}</a></li>"#, href, href))
        .collect();

    format!(
        r#"<html><head><title>{title}</title></head><body>
        <nav><a href="/">Home</a></nav>
        <article>
          <h1>{title}</h1>
          <p>This article walks through the topic in enough detail to count as real content.</p>
          <ul>{anchors}</ul>
        </article>
        </body></html>"#
    )
}

/// Mounts a GET route answering 200 with the given HTML
pub async fn serve_html(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(server)
        .await;
}

/// Mounts a GET route that must be requested exactly once
pub async fn serve_html_once(server: &MockServer, route: &str, html: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .expect(1)
        .mount(server)
        .await;
}

/// A document of 25 sentences of 100 characters each
pub fn long_document() -> String {
    (0..25)
        .map(|i| format!("Sentence number {:02} {}.", i, "x".repeat(80)))
        .collect::<Vec<_>>()
        .join(" ")
}
