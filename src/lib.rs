//! Sumi-Harvest: a polite content harvester
//!
//! This crate crawls websites and PDF documents, extracts readable content,
//! classifies it, and emits normalized records for downstream indexing.

pub mod config;
pub mod crawler;
pub mod dispatch;
pub mod drive;
pub mod extract;
pub mod output;
pub mod pdf;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed for {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("Render failed for {url}: {reason}")]
    RenderFailed { url: String, reason: String },

    #[error("Extraction failed for {url}: {reason}")]
    ExtractionFailed { url: String, reason: String },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HarvestError {
    /// Returns true for failures scoped to a single URL
    ///
    /// These are logged and skipped; everything else is a process-wide
    /// precondition failure.
    pub fn is_per_url(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. }
                | Self::RenderFailed { .. }
                | Self::ExtractionFailed { .. }
                | Self::InvalidUrl { .. }
                | Self::UrlError(_)
                | Self::UrlParse(_)
                | Self::Http(_)
        )
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Sumi-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use dispatch::{route, Harvester, HarvesterBuilder, Route};
pub use extract::{normalize_markdown, ContentType};
pub use output::ContentRecord;
