//! Link extraction from HTML
//!
//! Links are resolved against the page URL, stripped of fragments and
//! de-duplicated while preserving document order, so crawls over the same
//! pages always discover URLs in the same sequence.

use crate::url::LinkFilter;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Extracts all followable links from an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` anywhere in the document
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` and `data:` links
/// - Fragment-only anchors
/// - Non-HTTP(S) URLs after resolution
///
/// # Example
///
/// ```
/// use sumi_harvest::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/a#top">A</a><a href="/a">A again</a><a href="mailto:x@y.z">M</a>"#;
/// let base = Url::parse("https://example.com/blog").unwrap();
/// let links = extract_links(html, &base);
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.com/a");
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    let Ok(anchor) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&anchor) {
        if element.value().attr("download").is_some() {
            continue;
        }

        if let Some(url) = element
            .value()
            .attr("href")
            .and_then(|href| resolve_link(href, base_url))
        {
            if seen.insert(url.clone()) {
                links.push(url);
            }
        }
    }

    links
}

/// Extracts links and keeps only those the filter accepts
pub fn extract_filtered_links(html: &str, base_url: &Url, filter: &LinkFilter) -> Vec<Url> {
    extract_links(html, base_url)
        .into_iter()
        .filter(|url| filter.accepts(url))
        .collect()
}

/// Resolves an href to an absolute HTTP(S) URL without fragment
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let mut url = base_url.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);
    Some(url)
}
