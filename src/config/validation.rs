use crate::config::types::{
    Config, ContentTypeEntry, CrawlerConfig, DriveConfig, FilterConfig, PdfConfig, SelectorConfig,
};
use crate::extract::ContentType;
use crate::ConfigError;
use scraper::Selector;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_pdf_config(&config.pdf)?;
    validate_filter_config(&config.filters)?;
    validate_selectors(&config.selectors)?;
    validate_content_types(&config.content_types)?;
    validate_drive_config(&config.drive)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent < 1 || config.max_concurrent > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent must be between 1 and 100, got {}",
            config.max_concurrent
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1".to_string(),
        ));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(
            "max-retries must be >= 1".to_string(),
        ));
    }

    if !config.delay.is_finite() || config.delay < 0.0 {
        return Err(ConfigError::Validation(format!(
            "delay must be a non-negative number of seconds, got {}",
            config.delay
        )));
    }

    if config.request_timeout == 0 || config.head_timeout == 0 {
        return Err(ConfigError::Validation(
            "request-timeout and head-timeout must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates PDF chunking configuration
fn validate_pdf_config(config: &PdfConfig) -> Result<(), ConfigError> {
    if config.chunk_size == 0 {
        return Err(ConfigError::Validation(
            "chunk-size must be > 0".to_string(),
        ));
    }

    if config.chunk_overlap >= config.chunk_size {
        return Err(ConfigError::Validation(format!(
            "chunk-overlap ({}) must be smaller than chunk-size ({})",
            config.chunk_overlap, config.chunk_size
        )));
    }

    if config.max_retries < 1 {
        return Err(ConfigError::Validation(
            "pdf max-retries must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates length thresholds and pagination templates
fn validate_filter_config(config: &FilterConfig) -> Result<(), ConfigError> {
    if config.min_title_length > config.max_title_length {
        return Err(ConfigError::Validation(format!(
            "min-title-length ({}) exceeds max-title-length ({})",
            config.min_title_length, config.max_title_length
        )));
    }

    for template in &config.pagination_templates {
        if !template.contains("{n}") {
            return Err(ConfigError::Validation(format!(
                "Pagination template '{}' must contain '{{n}}'",
                template
            )));
        }

        if !template.starts_with('?') && !template.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "Pagination template '{}' must start with '?' or '/'",
                template
            )));
        }
    }

    Ok(())
}

/// Validates that every configured selector parses
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    let all = config
        .title
        .iter()
        .chain(&config.content)
        .chain(&config.author)
        .chain(&config.strip);

    for selector in all {
        Selector::parse(selector)
            .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))?;
    }

    Ok(())
}

/// Validates the content-type pattern table
fn validate_content_types(entries: &[ContentTypeEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        if entry.content_type == ContentType::Other {
            return Err(ConfigError::Validation(
                "'other' is the fallback content type and cannot carry patterns".to_string(),
            ));
        }

        if entry.patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Validation(format!(
                "Content type '{}' has an empty pattern",
                entry.content_type
            )));
        }
    }

    Ok(())
}

/// Validates Drive domain patterns
fn validate_drive_config(config: &DriveConfig) -> Result<(), ConfigError> {
    for pattern in &config.domains {
        validate_domain_pattern(pattern)?;
    }
    Ok(())
}

/// Validates a domain pattern (supports a leading `*.` wildcard)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    let domain = pattern.strip_prefix("*.").unwrap_or(pattern);

    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain pattern '{}' is empty",
            pattern
        )));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with(['.', '-']) || domain.ends_with(['.', '-']) || domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' is malformed",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'drive.google.com')",
            domain
        )));
    }

    Ok(())
}
