//! Integration tests for the crawl scheduler

use crate::common::{article, scheduler, serve_html, serve_html_once, test_config};
use std::collections::HashSet;
use sumi_harvest::ContentRecord;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

/// Mounts a small site whose pages link to each other in a cycle
async fn mount_cyclic_site(server: &MockServer) {
    serve_html_once(
        server,
        "/docs/start",
        article("Getting Started Guide", &["/docs/install", "/docs/usage"]),
    )
    .await;
    serve_html_once(
        server,
        "/docs/install",
        article("Installing The Tool", &["/docs/usage", "/docs/start", "/tag/setup"]),
    )
    .await;
    serve_html_once(
        server,
        "/docs/usage",
        article("Everyday Usage Notes", &["/docs/faq", "/docs/install#top"]),
    )
    .await;
    serve_html_once(
        server,
        "/docs/faq",
        article("Frequently Asked Questions", &["/docs/start", "mailto:team@example.com"]),
    )
    .await;
}

fn paths(visited: &[Url]) -> Vec<String> {
    visited.iter().map(|u| u.path().to_string()).collect()
}

fn titles(records: &[ContentRecord]) -> Vec<String> {
    records.iter().map(|r| r.title.clone()).collect()
}

#[tokio::test]
async fn test_never_visits_a_url_twice() {
    let server = MockServer::start().await;
    mount_cyclic_site(&server).await;

    let config = test_config();
    let outcome = scheduler(&config)
        .crawl(&[url(&server, "/docs/start")], "user1")
        .await;

    let unique: HashSet<_> = outcome.visited.iter().collect();
    assert_eq!(unique.len(), outcome.visited.len());
    assert_eq!(outcome.visited.len(), 4);
    assert_eq!(outcome.records.len(), 4);
    assert_eq!(outcome.failures, 0);
}

#[tokio::test]
async fn test_respects_page_budget() {
    let server = MockServer::start().await;
    for i in 1..=10 {
        let next = format!("/chain/{}", i + 1);
        serve_html(
            &server,
            &format!("/chain/{}", i),
            article(&format!("Chained Page Number {}", i), &[next.as_str()]),
        )
        .await;
    }

    let mut config = test_config();
    config.crawler.max_pages = 3;
    let outcome = scheduler(&config)
        .crawl(&[url(&server, "/chain/1")], "user1")
        .await;

    assert_eq!(outcome.visited.len(), 3);
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.visited[2].path(), "/chain/3");
}

#[tokio::test]
async fn test_sequential_matches_concurrent() {
    let config = test_config();

    let server = MockServer::start().await;
    mount_cyclic_site(&server).await;
    let concurrent = scheduler(&config)
        .crawl(&[url(&server, "/docs/start")], "user1")
        .await;

    let server = MockServer::start().await;
    mount_cyclic_site(&server).await;
    let sequential = scheduler(&config)
        .crawl_sequential(&[url(&server, "/docs/start")], "user1")
        .await;

    assert_eq!(paths(&concurrent.visited), paths(&sequential.visited));
    assert_eq!(titles(&concurrent.records), titles(&sequential.records));
}

#[tokio::test]
async fn test_server_error_contributes_no_records() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/docs/start",
        article("Getting Started Guide", &["/docs/broken", "/docs/usage"]),
    )
    .await;
    serve_html(&server, "/docs/usage", article("Everyday Usage Notes", &[])).await;
    Mock::given(method("GET"))
        .and(path("/docs/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let config = test_config();
    let outcome = scheduler(&config)
        .crawl(&[url(&server, "/docs/start")], "user1")
        .await;

    assert_eq!(outcome.failures, 1);
    assert_eq!(outcome.visited.len(), 3);
    assert_eq!(outcome.records.len(), 2);
    assert!(outcome
        .records
        .iter()
        .all(|r| !r.source_url.ends_with("/docs/broken")));
}

#[tokio::test]
async fn test_follow_links_disabled() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/docs/start",
        article("Getting Started Guide", &["/docs/usage"]),
    )
    .await;

    let mut config = test_config();
    config.crawler.follow_links = false;
    let outcome = scheduler(&config)
        .crawl(&[url(&server, "/docs/start")], "user1")
        .await;

    assert_eq!(outcome.visited.len(), 1);
    assert_eq!(outcome.records.len(), 1);
}
