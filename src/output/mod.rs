//! Output module for harvested records
//!
//! This module handles:
//! - The record shape shared by every pipeline
//! - Dropping invalid records and wrapping the rest in an output document
//! - Writing the document as pretty JSON
//! - Summary statistics

mod record;
pub mod stats;

pub use record::ContentRecord;
pub use stats::{print_statistics, HarvestStatistics};

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The JSON document written at the end of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub team_id: String,
    pub items: Vec<ContentRecord>,
}

/// Drops invalid records and wraps the rest for a team
///
/// # Arguments
///
/// * `team_id` - Team the records belong to
/// * `records` - Harvested records in emission order
/// * `min_content_length` - Minimum content length for a record to be kept
pub fn format_output(
    team_id: &str,
    records: Vec<ContentRecord>,
    min_content_length: usize,
) -> OutputDocument {
    let total = records.len();
    let items: Vec<_> = records
        .into_iter()
        .filter(|r| r.is_valid(min_content_length))
        .collect();

    if items.len() < total {
        tracing::info!("Dropped {} invalid records", total - items.len());
    }

    OutputDocument {
        team_id: team_id.to_string(),
        items,
    }
}

/// Default output file name for a team and user
pub fn default_output_path(team_id: &str, user_id: &str) -> PathBuf {
    PathBuf::from(format!("scraped_data_{}_{}.json", team_id, user_id))
}

/// Writes the document as pretty-printed JSON
pub fn write_output(document: &OutputDocument, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(path, json)?;
    tracing::info!(
        "Wrote {} records to {}",
        document.items.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ContentType;
    use tempfile::TempDir;

    fn record(title: &str, content: &str) -> ContentRecord {
        ContentRecord {
            title: title.to_string(),
            content: content.to_string(),
            content_type: ContentType::Blog,
            source_url: "https://example.com/post".to_string(),
            author: "Jane".to_string(),
            user_id: "user1".to_string(),
            chunk_index: None,
            total_chunks: None,
        }
    }

    #[test]
    fn test_format_output_drops_invalid() {
        let long = "y".repeat(60);
        let records = vec![
            record("Kept", &long),
            record("Too short", "tiny"),
            record("", &long),
        ];
        let document = format_output("team1", records, 50);

        assert_eq!(document.team_id, "team1");
        assert_eq!(document.items.len(), 1);
        assert_eq!(document.items[0].title, "Kept");
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path("team1", "user1"),
            PathBuf::from("scraped_data_team1_user1.json")
        );
    }

    #[test]
    fn test_write_output_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        let document = format_output("team1", vec![record("Kept", &"z".repeat(60))], 50);

        write_output(&document, &path).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["team_id"], "team1");
        assert_eq!(written["items"][0]["author"], "Jane");
        assert_eq!(written["items"][0]["content_type"], "blog");
    }
}
