//! Google Drive link resolution
//!
//! Drive share links point at viewer pages rather than documents. A
//! [`DriveResolver`] turns such a link into direct download URLs that the
//! PDF pipeline can consume.

use crate::{HarvestError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

static FILE_ID_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"/file/d/([A-Za-z0-9_-]+)",
        r"[?&]id=([A-Za-z0-9_-]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static FOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(?:drive/(?:u/\d+/)?)?folders/([A-Za-z0-9_-]+)").unwrap());

static RAW_FILE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"/file/d/([A-Za-z0-9_-]{10,})"#).unwrap());

static FILE_LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"a[href*="/file/d/"]"#).unwrap());

/// Attributes that may carry a file name on folder listing links
const NAME_ATTRIBUTES: [&str; 4] = ["title", "aria-label", "data-tooltip", "data-title"];

/// Resolves a Drive-style URL into direct download URLs
#[async_trait]
pub trait DriveResolver: Send + Sync {
    async fn resolve(&self, url: &Url) -> Result<Vec<String>>;
}

/// Builds the direct download URL for a Drive file id
pub fn download_url(file_id: &str) -> String {
    format!("https://drive.google.com/uc?export=download&id={}", file_id)
}

/// Extracts the file id from a Drive file link
///
/// Recognises `/file/d/<id>`, `open?id=<id>`, `uc?id=<id>` and
/// `uc?export=download&id=<id>`.
///
/// # Examples
///
/// ```
/// use sumi_harvest::drive::file_id;
///
/// assert_eq!(
///     file_id("https://drive.google.com/file/d/1AbC_d-E/view?usp=sharing"),
///     Some("1AbC_d-E".to_string())
/// );
/// assert_eq!(file_id("https://drive.google.com/open?id=XYZ123"), Some("XYZ123".to_string()));
/// assert_eq!(file_id("https://drive.google.com/drive/folders/abc"), None);
/// ```
pub fn file_id(url: &str) -> Option<String> {
    FILE_ID_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .map(|caps| caps[1].to_string())
}

/// Returns true for Drive folder links
pub fn is_folder(url: &str) -> bool {
    FOLDER_PATTERN.is_match(url)
}

/// Resolver for public Google Drive file and folder links
#[derive(Clone)]
pub struct GoogleDriveResolver {
    client: Client,
}

impl GoogleDriveResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn resolve_folder(&self, url: &Url) -> Result<Vec<String>> {
        let response = self.client.get(url.clone()).send().await?;
        if response.status() != StatusCode::OK {
            return Err(HarvestError::FetchFailed {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status().as_u16()),
            });
        }

        let html = response.text().await?;
        let ids = pdf_ids_in_folder(&html);
        tracing::info!("Drive folder {} lists {} PDF files", url, ids.len());

        Ok(ids.iter().map(|id| download_url(id)).collect())
    }
}

#[async_trait]
impl DriveResolver for GoogleDriveResolver {
    async fn resolve(&self, url: &Url) -> Result<Vec<String>> {
        if is_folder(url.as_str()) {
            return self.resolve_folder(url).await;
        }

        match file_id(url.as_str()) {
            Some(id) => {
                tracing::debug!("Drive file id {} from {}", id, url);
                Ok(vec![download_url(&id)])
            }
            None => Err(HarvestError::ExtractionFailed {
                url: url.to_string(),
                reason: "no Drive file id in URL".to_string(),
            }),
        }
    }
}

/// Collects ids of PDF files linked from a folder page
///
/// Links are kept when their name ends in `.pdf`. Pages whose links carry
/// no usable names fall back to every `/file/d/` id found in the raw HTML.
fn pdf_ids_in_folder(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    let mut named_links = 0;

    for link in document.root_element().select(&FILE_LINK_SELECTOR) {
        let Some(id) = link.value().attr("href").and_then(file_id) else {
            continue;
        };

        let name = NAME_ATTRIBUTES
            .iter()
            .filter_map(|attr| link.value().attr(attr))
            .map(str::to_string)
            .chain(std::iter::once(link.text().collect::<String>()))
            .map(|name| name.trim().to_string())
            .find(|name| !name.is_empty());

        if let Some(name) = name {
            named_links += 1;
            if name.to_lowercase().ends_with(".pdf") && seen.insert(id.clone()) {
                ids.push(id);
            }
        }
    }

    if named_links == 0 {
        for caps in RAW_FILE_LINK.captures_iter(html) {
            let id = caps[1].to_string();
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
    }

    ids
}
