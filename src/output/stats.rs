//! Statistics over harvested records
//!
//! Printed at the end of a run so the operator can see what each source
//! produced.

use crate::extract::ContentType;
use crate::output::ContentRecord;
use std::collections::{BTreeMap, HashSet};

/// Harvest statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestStatistics {
    /// Total number of records
    pub total_records: usize,

    /// Count of records by content type
    pub records_by_type: BTreeMap<ContentType, usize>,

    /// Records produced from PDF chunks
    pub pdf_chunks: usize,

    /// Number of distinct source URLs
    pub unique_sources: usize,

    /// Total characters of Markdown content
    pub total_characters: usize,
}

impl HarvestStatistics {
    /// Computes statistics for a set of records
    pub fn from_records(records: &[ContentRecord]) -> Self {
        let mut records_by_type = BTreeMap::new();
        let mut sources = HashSet::new();
        let mut pdf_chunks = 0;
        let mut total_characters = 0;

        for record in records {
            *records_by_type.entry(record.content_type).or_insert(0) += 1;
            sources.insert(record.source_url.as_str());
            if record.chunk_index.is_some() {
                pdf_chunks += 1;
            }
            total_characters += record.content.chars().count();
        }

        Self {
            total_records: records.len(),
            records_by_type,
            pdf_chunks,
            unique_sources: sources.len(),
            total_characters,
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Overview:");
    println!("  Total records: {}", stats.total_records);
    println!("  Unique sources: {}", stats.unique_sources);
    println!("  PDF chunks: {}", stats.pdf_chunks);
    println!("  Content characters: {}", stats.total_characters);
    println!();

    if stats.records_by_type.is_empty() {
        return;
    }

    println!("Records by Type:");
    let mut counts: Vec<_> = stats.records_by_type.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1));

    for (content_type, count) in counts {
        let percentage = (*count as f64 / stats.total_records as f64) * 100.0;
        println!("  {}: {} ({:.1}%)", content_type, count, percentage);
    }
    println!();
}
