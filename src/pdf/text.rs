//! Cleaning of extracted PDF text
//!
//! Raw PDF text carries page furniture ("Page 3 of 10"), stray symbols and
//! hard line wraps. Cleaning keeps paragraph breaks as blank lines and joins
//! everything else into single-spaced paragraphs.

use crate::extract::normalize_markdown;
use once_cell::sync::Lazy;
use regex::Regex;

static PAGE_OF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:Page\s+)?\d+\s*of\s*\d+\b").unwrap());

static PAGE_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bPage\s+\d+\b").unwrap());

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[^\w\s.,!?;:\-()\[\]{}"']"#).unwrap());

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t\r\x0C]*\n").unwrap());

/// Paragraphs shorter than this without terminal punctuation become headings
const HEADING_MAX_CHARS: usize = 100;

/// Cleans raw extracted text
///
/// Page-number boilerplate and characters outside the word/punctuation set
/// are removed, whitespace inside paragraphs collapses to single spaces and
/// paragraphs are separated by exactly one blank line.
pub fn clean_text(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\x0C', "\n\n");
    let text = PAGE_OF.replace_all(&text, " ");
    let text = PAGE_NUMBER.replace_all(&text, " ");
    let text = UNSAFE_CHARS.replace_all(&text, " ");

    PARAGRAPH_BREAK
        .split(&text)
        .map(|paragraph| paragraph.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|paragraph| !paragraph.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Converts cleaned chunk text to Markdown
///
/// Short paragraphs without terminal punctuation are taken as headings.
pub fn text_to_markdown(text: &str) -> String {
    let markdown = text
        .split("\n\n")
        .map(str::trim)
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| {
            let is_heading = paragraph.chars().count() < HEADING_MAX_CHARS
                && !paragraph.ends_with(['.', '!', '?']);
            if is_heading {
                format!("## {}", paragraph)
            } else {
                paragraph.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    normalize_markdown(&markdown)
}
