use crate::extract::ContentType;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Harvest
///
/// Every table is optional; missing tables and fields fall back to the
/// built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub render: RenderConfig,
    pub pdf: PdfConfig,
    pub filters: FilterConfig,
    pub selectors: SelectorConfig,
    #[serde(rename = "content-types")]
    pub content_types: Vec<ContentTypeEntry>,
    pub drive: DriveConfig,
}

impl Config {
    /// Returns the ordered content-type table, falling back to the defaults
    /// when the configuration file does not declare one
    pub fn content_type_table(&self) -> Vec<ContentTypeEntry> {
        if self.content_types.is_empty() {
            default_content_types()
        } else {
            self.content_types.clone()
        }
    }
}

/// Crawl and fetch behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Page budget for one crawl and upper bound for pagination probing
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Politeness delay upper bound in seconds, also the linear backoff base
    pub delay: f64,

    /// Total number of static fetch attempts
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Request timeout in seconds
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Timeout for pagination existence checks in seconds
    #[serde(rename = "head-timeout")]
    pub head_timeout: u64,

    /// Number of pages fetched in parallel per batch
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: usize,

    /// Whether the scheduler enqueues outbound links of fetched pages
    #[serde(rename = "follow-links")]
    pub follow_links: bool,

    /// Listing pages yielding fewer links than this are also rendered
    #[serde(rename = "link-threshold")]
    pub link_threshold: usize,

    /// User agent sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            delay: 1.0,
            max_retries: 3,
            request_timeout: 30,
            head_timeout: 10,
            max_concurrent: 10,
            follow_links: true,
            link_threshold: 5,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

impl CrawlerConfig {
    /// Politeness delay upper bound
    pub fn delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay.max(0.0))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn head_timeout(&self) -> Duration {
        Duration::from_secs(self.head_timeout)
    }
}

/// Headless rendering configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Launch a headless browser for rendered fetches
    pub enabled: bool,

    /// Run the browser without a window
    pub headless: bool,

    /// Wait after navigation before capturing the page (milliseconds)
    #[serde(rename = "settle-delay-ms")]
    pub settle_delay_ms: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            headless: true,
            settle_delay_ms: 2000,
        }
    }
}

impl RenderConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// PDF download and chunking configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Target chunk size in characters
    #[serde(rename = "chunk-size")]
    pub chunk_size: usize,

    /// Trailing text carried into the next chunk, in characters
    #[serde(rename = "chunk-overlap")]
    pub chunk_overlap: usize,

    /// Chunks shorter than this are merged into the preceding chunk
    #[serde(rename = "min-chunk-size")]
    pub min_chunk_size: usize,

    /// Total number of download attempts
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Backoff base in seconds; attempt `n` waits `n * retry-backoff-secs`
    #[serde(rename = "retry-backoff-secs")]
    pub retry_backoff_secs: u64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_chunk_size: 100,
            max_retries: 3,
            retry_backoff_secs: 2,
        }
    }
}

/// Content and URL filtering configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    #[serde(rename = "min-content-length")]
    pub min_content_length: usize,

    #[serde(rename = "min-title-length")]
    pub min_title_length: usize,

    #[serde(rename = "max-title-length")]
    pub max_title_length: usize,

    /// Substrings that exclude a discovered link
    #[serde(rename = "skip-url-patterns")]
    pub skip_url_patterns: Vec<String>,

    /// Path substrings that mark a listing page
    #[serde(rename = "listing-patterns")]
    pub listing_patterns: Vec<String>,

    /// Pagination URL templates; `{n}` is replaced by the page number
    #[serde(rename = "pagination-templates")]
    pub pagination_templates: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_content_length: 50,
            min_title_length: 10,
            max_title_length: 200,
            skip_url_patterns: strings(&[
                "/tag/",
                "/category/",
                "/author/",
                "/search",
                "/page/",
                "/#",
                "javascript:",
                "mailto:",
                "tel:",
                ".pdf",
                ".jpg",
                ".png",
                ".gif",
                ".css",
                ".js",
            ]),
            listing_patterns: strings(&[
                "/blog",
                "/posts",
                "/articles",
                "/topics",
                "/learn",
                "/category",
                "/tag",
                "/archive",
                "/search",
            ]),
            pagination_templates: strings(&[
                "?page={n}",
                "?p={n}",
                "/page/{n}",
                "/p/{n}",
                "?pg={n}",
                "?pagination={n}",
            ]),
        }
    }
}

/// CSS selectors used by the content extractor, in priority order
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub title: Vec<String>,
    pub content: Vec<String>,
    pub author: Vec<String>,
    /// Elements removed before any extraction
    pub strip: Vec<String>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            title: strings(&[
                "h1",
                "title",
                "[class*=\"title\"]",
                "[class*=\"heading\"]",
                "h2",
                "h3",
            ]),
            content: strings(&[
                "main",
                "article",
                "[class*=\"content\"]",
                "[class*=\"post\"]",
                "[class*=\"blog\"]",
                ".entry-content",
                ".post-content",
                ".article-content",
                "main article",
                "div[role=\"main\"]",
            ]),
            author: strings(&[
                "[class*=\"author\"]",
                "[class*=\"byline\"]",
                ".author",
                ".byline",
                "[rel=\"author\"]",
                "meta[name=\"author\"]",
            ]),
            strip: strings(&["script", "style", "nav", "header", "footer"]),
        }
    }
}

/// One row of the ordered content-type pattern table
#[derive(Debug, Clone, Deserialize)]
pub struct ContentTypeEntry {
    #[serde(rename = "content-type")]
    pub content_type: ContentType,
    pub patterns: Vec<String>,
}

/// Default content-type table; order decides ties
pub fn default_content_types() -> Vec<ContentTypeEntry> {
    let entry = |content_type, patterns: &[&str]| ContentTypeEntry {
        content_type,
        patterns: strings(patterns),
    };

    vec![
        entry(ContentType::Blog, &["blog", "post", "article"]),
        entry(ContentType::PodcastTranscript, &["podcast", "transcript"]),
        entry(ContentType::LinkedinPost, &["linkedin.com"]),
        entry(ContentType::RedditComment, &["reddit.com"]),
        entry(ContentType::Book, &["book"]),
        entry(ContentType::CallTranscript, &["call", "transcript"]),
    ]
}

/// Google-Drive-style link resolution
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Domain patterns (e.g., "drive.google.com" or "*.example.com")
    pub domains: Vec<String>,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            domains: strings(&["drive.google.com", "docs.google.com"]),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
