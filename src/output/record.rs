use crate::extract::ContentType;
use serde::{Deserialize, Serialize};

/// A single harvested item ready for indexing
///
/// PDF-derived records carry `chunk_index` and `total_chunks`; web records
/// leave them unset and they are omitted from JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRecord {
    pub title: String,
    /// Normalized Markdown
    pub content: String,
    pub content_type: ContentType,
    pub source_url: String,
    pub author: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_chunks: Option<usize>,
}

impl ContentRecord {
    /// Returns true if the record may be emitted
    ///
    /// Title, content and source URL must be non-empty and the content must
    /// be at least `min_content_length` characters long.
    pub fn is_valid(&self, min_content_length: usize) -> bool {
        !self.title.trim().is_empty()
            && !self.source_url.trim().is_empty()
            && !self.content.trim().is_empty()
            && self.content.chars().count() >= min_content_length
    }

    /// Key used to drop records emitted twice within a run
    pub fn dedup_key(&self) -> (String, Option<usize>) {
        (self.source_url.clone(), self.chunk_index)
    }
}
