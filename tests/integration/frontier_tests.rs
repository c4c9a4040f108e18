//! Integration tests for listing-page expansion

use crate::common::{article, fetcher, serve_html, test_config};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use sumi_harvest::crawler::{FrontierExpander, Renderer};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

fn paths(urls: &[Url]) -> Vec<String> {
    urls.iter().map(|u| u.path().to_string()).collect()
}

#[tokio::test]
async fn test_non_listing_expands_to_itself() {
    let server = MockServer::start().await;
    let config = test_config();
    let expander = FrontierExpander::new(fetcher(&config), &config);

    let seed = url(&server, "/about-us");
    assert_eq!(expander.expand(&seed).await, vec![seed]);
}

#[tokio::test]
async fn test_listing_returns_filtered_links() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/blog",
        article(
            "Engineering Blog Index",
            &[
                "/blog/first-post",
                "/blog/second-post",
                "/blog/third-post",
                "/blog/first-post",
                "/tag/rust/",
                "/",
                "https://elsewhere.example.org/blog/post",
                "javascript:void(0)",
            ],
        ),
    )
    .await;

    // Every pagination candidate answers 404, so probing stops at page 1
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .expect(6)
        .mount(&server)
        .await;

    let config = test_config();
    let expander = FrontierExpander::new(fetcher(&config), &config);
    let urls = expander.expand(&url(&server, "/blog")).await;

    assert_eq!(
        paths(&urls),
        vec!["/blog/first-post", "/blog/second-post", "/blog/third-post"]
    );
}

#[tokio::test]
async fn test_pagination_adds_links_until_exhausted() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/articles"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(article(
            "Articles Page Two",
            &["/articles/gamma", "/articles/delta", "/articles/alpha"],
        )))
        .mount(&server)
        .await;
    serve_html(
        &server,
        "/articles",
        article("Articles Page One", &["/articles/alpha", "/articles/beta"]),
    )
    .await;

    let config = test_config();
    let expander = FrontierExpander::new(fetcher(&config), &config);
    let urls = expander.expand(&url(&server, "/articles")).await;

    assert_eq!(
        paths(&urls),
        vec![
            "/articles/alpha",
            "/articles/beta",
            "/articles/gamma",
            "/articles/delta"
        ]
    );
}

#[tokio::test]
async fn test_pagination_stops_when_no_new_links() {
    let server = MockServer::start().await;
    let listing = article("Posts Listing Page", &["/posts/one", "/posts/two"]);

    // Page 1 exists but only repeats the links of the seed
    Mock::given(method("HEAD"))
        .and(path("/posts"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/posts"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    serve_html(&server, "/posts", listing).await;

    let config = test_config();
    let expander = FrontierExpander::new(fetcher(&config), &config);
    let urls = expander.expand(&url(&server, "/posts")).await;

    assert_eq!(paths(&urls), vec!["/posts/one", "/posts/two"]);
}

/// Renderer returning fixed HTML and counting its calls
struct ListingRenderer {
    html: String,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Renderer for ListingRenderer {
    async fn render(&self, _url: &str) -> sumi_harvest::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.html.clone())
    }
}

async fn mount_missing_pagination(server: &MockServer) {
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_few_static_links_add_rendered_links() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/blog",
        article("Engineering Blog Index", &["/blog/a"]),
    )
    .await;
    mount_missing_pagination(&server).await;

    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = ListingRenderer {
        html: article(
            "Engineering Blog Index",
            &["/blog/a", "/blog/b", "/blog/c"],
        ),
        calls: Arc::clone(&calls),
    };

    let config = test_config();
    let expander =
        FrontierExpander::new(fetcher(&config).with_renderer(Arc::new(renderer)), &config);
    let urls = expander.expand(&url(&server, "/blog")).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(paths(&urls), vec!["/blog/a", "/blog/b", "/blog/c"]);
}

#[tokio::test]
async fn test_enough_static_links_skip_rendering() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/blog",
        article(
            "Engineering Blog Index",
            &["/blog/a", "/blog/b", "/blog/c", "/blog/d", "/blog/e"],
        ),
    )
    .await;
    mount_missing_pagination(&server).await;

    let calls = Arc::new(AtomicUsize::new(0));
    let renderer = ListingRenderer {
        html: article("Engineering Blog Index", &["/blog/z"]),
        calls: Arc::clone(&calls),
    };

    let config = test_config();
    let expander =
        FrontierExpander::new(fetcher(&config).with_renderer(Arc::new(renderer)), &config);
    let urls = expander.expand(&url(&server, "/blog")).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(urls.len(), 5);
}
