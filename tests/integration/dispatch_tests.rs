//! Integration tests for routing and the harvest loop

use crate::common::{article, long_document, serve_html, test_config, NoSleep};
use crate::pdf_tests::{serve_pdf, StubExtractor};
use async_trait::async_trait;
use std::sync::Arc;
use sumi_harvest::drive::DriveResolver;
use sumi_harvest::output::{format_output, write_output, OutputDocument};
use sumi_harvest::{ContentType, Harvester, HarvesterBuilder};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Resolver that returns a fixed list of download URLs
struct FixedResolver(Vec<String>);

#[async_trait]
impl DriveResolver for FixedResolver {
    async fn resolve(&self, _url: &Url) -> sumi_harvest::Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

fn builder() -> HarvesterBuilder {
    Harvester::builder(test_config()).sleeper(Arc::new(NoSleep))
}

#[tokio::test]
async fn test_listing_url_is_expanded_and_crawled() {
    let server = MockServer::start().await;
    serve_html(
        &server,
        "/blog",
        article(
            "Engineering Blog Index",
            &["/blog/first-post", "/blog/second-post", "/blog/third-post"],
        ),
    )
    .await;
    for slug in ["first-post", "second-post", "third-post"] {
        serve_html(
            &server,
            &format!("/blog/{}", slug),
            article(&format!("The Story Of The {}", slug), &[]),
        )
        .await;
    }

    let harvester = builder().build().unwrap();
    let records = harvester
        .harvest(&[format!("{}/blog", server.uri())], "user1")
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.content_type == ContentType::Blog));
    assert!(records[0].source_url.ends_with("/blog/first-post"));
}

#[tokio::test]
async fn test_failures_do_not_stop_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken-page"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;
    serve_html(&server, "/about-us", article("About Our Company", &[])).await;

    let harvester = builder().build().unwrap();
    let urls = vec![
        format!("{}/broken-page", server.uri()),
        "not a url".to_string(),
        format!("{}/about-us", server.uri()),
    ];
    let records = harvester.harvest(&urls, "user1").await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "About Our Company");
}

#[tokio::test]
async fn test_duplicate_inputs_are_merged() {
    let server = MockServer::start().await;
    serve_html(&server, "/about-us", article("About Our Company", &[])).await;

    let harvester = builder().build().unwrap();
    let url = format!("{}/about-us", server.uri());
    let records = harvester
        .harvest(&[url.clone(), url], "user1")
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_drive_link_goes_through_resolver() {
    let server = MockServer::start().await;
    serve_pdf(&server, "/uc/handbook.pdf").await;

    let drive_link = "https://drive.google.com/file/d/HANDBOOK/view".to_string();
    let harvester = builder()
        .text_extractor(Arc::new(StubExtractor(long_document())))
        .drive_resolver(Arc::new(FixedResolver(vec![
            drive_link.clone(),
            format!("{}/uc/handbook.pdf", server.uri()),
        ])))
        .build()
        .unwrap();

    let records = harvester.harvest(&[drive_link], "user1").await.unwrap();

    assert_eq!(records.len(), 3);
    assert!(records.iter().all(|r| r.title.starts_with("Handbook - Part")));
}

#[tokio::test]
async fn test_output_file_round_trip() {
    let server = MockServer::start().await;
    serve_html(&server, "/about-us", article("About Our Company", &[])).await;

    let harvester = builder().build().unwrap();
    let records = harvester
        .harvest(&[format!("{}/about-us", server.uri())], "user1")
        .await
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scraped_data_team1_user1.json");
    let document = format_output("team1", records, 50);
    write_output(&document, &path).unwrap();

    let written: OutputDocument =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(written, document);
    assert_eq!(written.items[0].content_type, ContentType::Other);
}
