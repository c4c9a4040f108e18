/// Checks if a domain matches a wildcard pattern
///
/// Two pattern shapes are supported:
/// 1. Exact: "drive.google.com" matches only "drive.google.com"
/// 2. Wildcard: "*.example.com" matches "example.com" and any subdomain of it
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::matches_wildcard;
///
/// assert!(matches_wildcard("drive.google.com", "drive.google.com"));
/// assert!(!matches_wildcard("drive.google.com", "google.com"));
///
/// assert!(matches_wildcard("*.example.com", "example.com"));
/// assert!(matches_wildcard("*.example.com", "a.b.example.com"));
/// assert!(!matches_wildcard("*.example.com", "badexample.com"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .map_or(false, |prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches_wildcard("docs.google.com", "docs.google.com"));
        assert!(!matches_wildcard("docs.google.com", "sub.docs.google.com"));
    }

    #[test]
    fn test_wildcard_match() {
        assert!(matches_wildcard("*.google.com", "google.com"));
        assert!(matches_wildcard("*.google.com", "drive.google.com"));
        assert!(!matches_wildcard("*.google.com", "notgoogle.com"));
        assert!(!matches_wildcard("*.google.com", "google.com.evil.org"));
    }
}
