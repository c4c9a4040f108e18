//! URL handling module for Sumi-Harvest
//!
//! This module provides seed parsing, domain helpers, listing-page detection,
//! the link validity filter used during frontier expansion and crawling, and
//! pagination candidate construction.

mod domain;
mod matcher;

use crate::{UrlError, UrlResult};
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, host_matches_any, same_site};
pub use matcher::matches_wildcard;

/// Parses an absolute HTTP(S) URL and drops its fragment
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::parse_http_url;
///
/// let url = parse_http_url("https://example.com/post#comments").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/post");
/// assert!(parse_http_url("ftp://example.com/").is_err());
/// ```
pub fn parse_http_url(input: &str) -> UrlResult<Url> {
    let mut url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Returns true when the URL path contains one of the listing patterns
///
/// Matching is case-insensitive and only looks at the path, so a query
/// string mentioning "/blog" does not turn a page into a listing.
pub fn is_listing_page(url: &Url, patterns: &[String]) -> bool {
    let path = url.path().to_lowercase();
    patterns.iter().any(|p| path.contains(&p.to_lowercase()))
}

/// Returns true when the URL looks like a PDF document
///
/// Any occurrence of "pdf" in the lowercased URL counts, so `.pdf` paths,
/// `/pdf/` directories and `?format=pdf` downloads all qualify.
pub fn is_pdf_url(url: &Url) -> bool {
    url.as_str().to_lowercase().contains("pdf")
}

/// Derives a readable title from the last path segment of a URL
///
/// The file extension is dropped, `-` and `_` become spaces and every word
/// is capitalised. A URL without path segments falls back to its host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_harvest::url::title_from_url;
///
/// let url = Url::parse("https://example.com/blog/rust-ownership_guide/").unwrap();
/// assert_eq!(title_from_url(&url), "Rust Ownership Guide");
///
/// let url = Url::parse("https://example.com/files/annual_REPORT.pdf").unwrap();
/// assert_eq!(title_from_url(&url), "Annual Report");
/// ```
pub fn title_from_url(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| s.replace("%20", " "));

    let Some(segment) = segment else {
        return extract_domain(url).unwrap_or_default();
    };

    let stem = match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() <= 5 => stem.to_string(),
        _ => segment,
    };

    stem.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Decides which discovered links are worth crawling
///
/// A link passes when it lives on the same site as the base URL, has a
/// non-root path, and none of the skip patterns occur in it.
#[derive(Debug, Clone)]
pub struct LinkFilter {
    base: Url,
    skip_patterns: Vec<String>,
}

impl LinkFilter {
    /// Creates a filter anchored on the given base URL
    pub fn new(base: &Url, skip_patterns: &[String]) -> Self {
        Self {
            base: base.clone(),
            skip_patterns: skip_patterns.iter().map(|p| p.to_lowercase()).collect(),
        }
    }

    /// Returns true if the link should be followed
    pub fn accepts(&self, url: &Url) -> bool {
        if !same_site(&self.base, url) {
            return false;
        }

        let path = url.path();
        if path.is_empty() || path == "/" {
            return false;
        }

        let lowered = url.as_str().to_lowercase();
        !self.skip_patterns.iter().any(|p| lowered.contains(p.as_str()))
    }
}

/// Builds the pagination candidate for page `n` from a template
///
/// Query templates (`?page={n}`) add a query pair to the seed URL, keeping
/// any existing query. Path templates (`/page/{n}`) are appended to the
/// seed path with its trailing slash removed.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_harvest::url::pagination_candidate;
///
/// let seed = Url::parse("https://example.com/blog/").unwrap();
/// let next = pagination_candidate(&seed, "/page/{n}", 2).unwrap();
/// assert_eq!(next.as_str(), "https://example.com/blog/page/2");
///
/// let next = pagination_candidate(&seed, "?page={n}", 2).unwrap();
/// assert_eq!(next.as_str(), "https://example.com/blog/?page=2");
/// ```
pub fn pagination_candidate(seed: &Url, template: &str, n: usize) -> Option<Url> {
    let rendered = template.replace("{n}", &n.to_string());
    let mut candidate = seed.clone();
    candidate.set_fragment(None);

    if let Some(query) = rendered.strip_prefix('?') {
        let (key, value) = query.split_once('=')?;
        candidate.query_pairs_mut().append_pair(key, value);
        return Some(candidate);
    }

    if rendered.starts_with('/') {
        let path = format!("{}{}", seed.path().trim_end_matches('/'), rendered);
        candidate.set_path(&path);
        return Some(candidate);
    }

    None
}
