//! PDF pipeline for Sumi-Harvest
//!
//! This module handles PDF documents end to end:
//! - Downloading with retries and content-type checks
//! - Text extraction through a [`TextExtractor`]
//! - Cleaning, overlapping chunking and Markdown conversion
//! - One [`ContentRecord`] per chunk

mod chunker;
mod text;

pub use chunker::{chunk_text, ChunkSettings, PdfChunk};
pub use text::{clean_text, text_to_markdown};

use crate::config::PdfConfig;
use crate::crawler::{linear_backoff, Sleeper};
use crate::extract::ContentType;
use crate::output::ContentRecord;
use crate::url::title_from_url;
use crate::{HarvestError, Result};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Title used when neither metadata nor the URL provide one
const DEFAULT_PDF_TITLE: &str = "PDF Document";

/// Text and metadata extracted from a PDF
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfText {
    pub text: String,
    pub page_count: Option<usize>,
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Extracts text from PDF bytes
///
/// Runs on a blocking thread, so implementations may be CPU-heavy.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> std::result::Result<PdfText, String>;
}

/// [`TextExtractor`] backed by the `pdf-extract` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractText;

impl TextExtractor for PdfExtractText {
    fn extract(&self, bytes: &[u8]) -> std::result::Result<PdfText, String> {
        let text = pdf_extract::extract_text_from_mem(bytes).map_err(|e| e.to_string())?;
        // Pages are separated by form feeds when the text layer keeps them
        let page_count = text
            .contains('\x0C')
            .then(|| text.trim_end_matches('\x0C').matches('\x0C').count() + 1);

        Ok(PdfText {
            text,
            page_count,
            title: None,
            author: None,
        })
    }
}

/// Downloads, extracts and chunks PDF documents
#[derive(Clone)]
pub struct PdfPipeline {
    client: Client,
    sleeper: Arc<dyn Sleeper>,
    extractor: Arc<dyn TextExtractor>,
    config: PdfConfig,
    request_timeout: Duration,
    min_content_length: usize,
}

impl PdfPipeline {
    pub fn new(
        client: Client,
        sleeper: Arc<dyn Sleeper>,
        extractor: Arc<dyn TextExtractor>,
        config: PdfConfig,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            sleeper,
            extractor,
            config,
            request_timeout,
            min_content_length: 0,
        }
    }

    /// Drops chunks whose Markdown is shorter than `min` characters
    ///
    /// Chunks are numbered after this filter, so `total_chunks` always
    /// matches the records that are emitted.
    pub fn with_min_content_length(mut self, min: usize) -> Self {
        self.min_content_length = min;
        self
    }

    /// Produces one record per chunk of the PDF at `url`
    ///
    /// # Returns
    ///
    /// * `Ok(records)` - Records titled `"<title> - Part <n>"` with chunk metadata
    /// * `Err(HarvestError::FetchFailed)` - Download failed after all attempts
    /// * `Err(HarvestError::ExtractionFailed)` - Not a PDF, or no text in it
    pub async fn scrape_pdf(&self, url: &Url, user_id: &str) -> Result<Vec<ContentRecord>> {
        let bytes = self.download(url).await?;
        tracing::debug!("Downloaded {} bytes from {}", bytes.len(), url);

        let extractor = Arc::clone(&self.extractor);
        let pdf = tokio::task::spawn_blocking(move || extractor.extract(&bytes))
            .await
            .map_err(|e| extraction_failed(url, format!("extraction task failed: {}", e)))?
            .map_err(|reason| extraction_failed(url, reason))?;

        let cleaned = clean_text(&pdf.text);
        if cleaned.is_empty() {
            return Err(extraction_failed(url, "no text".to_string()));
        }

        let title = pdf
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| pdf_title_from_url(url));
        let author = pdf.author.clone().unwrap_or_default();

        let chunks = chunk_text(&cleaned, ChunkSettings::from(&self.config));
        tracing::info!(
            "PDF {} ({} pages): {} characters in {} chunks",
            url,
            pdf.page_count
                .map_or_else(|| "unknown".to_string(), |n| n.to_string()),
            cleaned.chars().count(),
            chunks.len()
        );

        let parts: Vec<String> = chunks
            .iter()
            .map(|chunk| text_to_markdown(&chunk.text))
            .filter(|content| content.chars().count() >= self.min_content_length)
            .collect();
        if parts.len() < chunks.len() {
            tracing::debug!(
                "Dropped {} short chunks of {}",
                chunks.len() - parts.len(),
                url
            );
        }

        let total = parts.len();
        Ok(parts
            .into_iter()
            .enumerate()
            .map(|(index, content)| ContentRecord {
                title: format!("{} - Part {}", title, index + 1),
                content,
                content_type: ContentType::Book,
                source_url: url.to_string(),
                author: author.clone(),
                user_id: user_id.to_string(),
                chunk_index: Some(index),
                total_chunks: Some(total),
            })
            .collect())
    }

    /// Downloads PDF bytes
    ///
    /// Failed requests and non-200 responses are retried after
    /// `retry-backoff-secs * attempt`. A 200 response that is not a PDF fails
    /// immediately.
    async fn download(&self, url: &Url) -> Result<Vec<u8>> {
        let max_attempts = self.config.max_retries.max(1);
        let backoff = Duration::from_secs(self.config.retry_backoff_secs);
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            tracing::debug!("Downloading {} (attempt {}/{})", url, attempt, max_attempts);

            match self
                .client
                .get(url.clone())
                .timeout(self.request_timeout)
                .send()
                .await
            {
                Ok(response) if response.status() == StatusCode::OK => {
                    let content_type = response
                        .headers()
                        .get(reqwest::header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_lowercase();

                    if !is_pdf_response(&content_type, url) {
                        return Err(extraction_failed(
                            url,
                            format!("not a PDF (content type '{}')", content_type),
                        ));
                    }

                    match response.bytes().await {
                        Ok(bytes) => return Ok(bytes.to_vec()),
                        Err(e) => last_error = e.to_string(),
                    }
                }
                Ok(response) => last_error = format!("HTTP {}", response.status().as_u16()),
                Err(e) => last_error = e.to_string(),
            }

            if attempt < max_attempts {
                self.sleeper.sleep(linear_backoff(backoff, attempt)).await;
            }
        }

        Err(HarvestError::FetchFailed {
            url: url.to_string(),
            reason: format!("{} after {} attempts", last_error, max_attempts),
        })
    }
}

fn is_pdf_response(content_type: &str, url: &Url) -> bool {
    content_type.contains("pdf")
        || content_type.contains("octet-stream")
        || url.path().to_lowercase().ends_with(".pdf")
}

/// Title from a `.pdf` file name in the URL, else the default title
fn pdf_title_from_url(url: &Url) -> String {
    if url.path().to_lowercase().ends_with(".pdf") {
        let title = title_from_url(url);
        if !title.is_empty() {
            return title;
        }
    }
    DEFAULT_PDF_TITLE.to_string()
}

fn extraction_failed(url: &Url, reason: String) -> HarvestError {
    HarvestError::ExtractionFailed {
        url: url.to_string(),
        reason,
    }
}
