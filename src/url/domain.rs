use crate::url::matcher::matches_wildcard;
use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_harvest::url::extract_domain;
///
/// let url = Url::parse("https://Blog.Example.COM/post").unwrap();
/// assert_eq!(extract_domain(&url), Some("blog.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true when both URLs point at the same host and port
///
/// The port is part of the comparison so that two local servers on
/// different ports are treated as different sites.
pub fn same_site(a: &Url, b: &Url) -> bool {
    extract_domain(a).is_some()
        && extract_domain(a) == extract_domain(b)
        && a.port_or_known_default() == b.port_or_known_default()
}

/// Returns true when the URL's host matches any of the domain patterns
pub fn host_matches_any(url: &Url, patterns: &[String]) -> bool {
    match extract_domain(url) {
        Some(host) => patterns.iter().any(|p| matches_wildcard(p, &host)),
        None => false,
    }
}
