//! Integration tests for the PDF pipeline

use crate::common::{long_document, test_config, NoSleep};
use std::sync::Arc;
use sumi_harvest::pdf::{PdfText, TextExtractor};
use sumi_harvest::{ContentType, Harvester};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Extractor returning a fixed document regardless of the bytes
pub struct StubExtractor(pub String);

impl TextExtractor for StubExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<PdfText, String> {
        if !bytes.starts_with(b"%PDF") {
            return Err("not a PDF".to_string());
        }
        Ok(PdfText {
            text: self.0.clone(),
            page_count: Some(3),
            title: None,
            author: None,
        })
    }
}

pub async fn serve_pdf(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.7 stub".to_vec()),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_pdf_becomes_three_chunk_records() {
    let server = MockServer::start().await;
    serve_pdf(&server, "/reports/quarterly_review.pdf").await;

    let harvester = Harvester::builder(test_config())
        .sleeper(Arc::new(NoSleep))
        .text_extractor(Arc::new(StubExtractor(long_document())))
        .build()
        .unwrap();

    let urls = vec![format!("{}/reports/quarterly_review.pdf", server.uri())];
    let records = harvester.harvest(&urls, "user7").await.unwrap();

    assert_eq!(records.len(), 3);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.title, format!("Quarterly Review - Part {}", i + 1));
        assert_eq!(record.content_type, ContentType::Book);
        assert_eq!(record.chunk_index, Some(i));
        assert_eq!(record.total_chunks, Some(3));
        assert_eq!(record.user_id, "user7");
        assert!(record.content.chars().count() <= 1000);
    }
}

#[tokio::test]
async fn test_empty_pdf_is_skipped() {
    let server = MockServer::start().await;
    serve_pdf(&server, "/scans/blank.pdf").await;

    let harvester = Harvester::builder(test_config())
        .sleeper(Arc::new(NoSleep))
        .text_extractor(Arc::new(StubExtractor("  Page 1 of 1  ".to_string())))
        .build()
        .unwrap();

    let urls = vec![format!("{}/scans/blank.pdf", server.uri())];
    let records = harvester.harvest(&urls, "user7").await.unwrap();

    assert!(records.is_empty());
}
