//! Content classification
//!
//! Classification walks an ordered table of `(content type, patterns)` rows
//! and returns the first type with a pattern occurring in the URL or the
//! title. The row order decides ties, so the table is kept exactly as
//! configured.

use crate::config::ContentTypeEntry;
use serde::{Deserialize, Serialize};

/// Closed set of content categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[serde(alias = "post", alias = "article", alias = "webpage", alias = "web")]
    Blog,
    #[serde(alias = "podcast")]
    PodcastTranscript,
    #[serde(alias = "linkedin")]
    LinkedinPost,
    #[serde(alias = "reddit")]
    RedditComment,
    #[serde(alias = "pdf")]
    Book,
    #[serde(alias = "call")]
    CallTranscript,
    Other,
}

impl ContentType {
    /// Returns the label used in output records
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blog => "blog",
            Self::PodcastTranscript => "podcast_transcript",
            Self::LinkedinPost => "linkedin_post",
            Self::RedditComment => "reddit_comment",
            Self::Book => "book",
            Self::CallTranscript => "call_transcript",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered pattern classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<(ContentType, Vec<String>)>,
}

impl Classifier {
    /// Builds a classifier from the configured table, keeping its order
    ///
    /// Patterns are lowercased once here. Rows for `Other` are ignored since
    /// it is the fallback.
    pub fn new(table: &[ContentTypeEntry]) -> Self {
        let rules = table
            .iter()
            .filter(|entry| entry.content_type != ContentType::Other)
            .map(|entry| {
                let patterns = entry.patterns.iter().map(|p| p.to_lowercase()).collect();
                (entry.content_type, patterns)
            })
            .collect();

        Self { rules }
    }

    /// Classifies a page by its URL and title (or content)
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_harvest::config::default_content_types;
    /// use sumi_harvest::extract::{Classifier, ContentType};
    ///
    /// let classifier = Classifier::new(&default_content_types());
    /// assert_eq!(
    ///     classifier.classify("https://x.com/podcast/ep1-transcript", ""),
    ///     ContentType::PodcastTranscript
    /// );
    /// ```
    pub fn classify(&self, url: &str, title_or_content: &str) -> ContentType {
        let url = url.to_lowercase();
        let text = title_or_content.to_lowercase();

        self.rules
            .iter()
            .find(|(_, patterns)| {
                patterns
                    .iter()
                    .any(|p| url.contains(p.as_str()) || text.contains(p.as_str()))
            })
            .map(|(content_type, _)| *content_type)
            .unwrap_or(ContentType::Other)
    }
}
