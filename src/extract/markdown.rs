//! Markdown normalization
//!
//! HTML input is converted with `html2md`; plain input is only cleaned.
//! The cleaned form uses ATX headings surrounded by blank lines, `-`
//! bullets, single spaces inside lines and no repeated blank lines.
//! Normalizing an already normalized string returns it unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[A-Za-z][A-Za-z0-9-]*(?:\s[^<>]*)?/?>").unwrap());

static INNER_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

static ATX_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s+\S").unwrap());

static SETEXT_H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"^=+$").unwrap());

static SETEXT_H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-{3,}$").unwrap());

static THEMATIC_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(?:\*\s*){3,}|(?:-\s*){3,}|(?:_\s*){3,})$").unwrap());

static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[-*+]|\d+[.)])\s").unwrap());

/// Returns true when the input contains at least one HTML tag
pub fn looks_like_html(content: &str) -> bool {
    TAG.is_match(content)
}

/// Converts content to normalized Markdown
///
/// # Examples
///
/// ```
/// use sumi_harvest::normalize_markdown;
///
/// let md = normalize_markdown("<h2>Intro</h2><ul><li>one</li><li>two</li></ul>");
/// assert!(md.starts_with("## Intro\n\n"));
/// assert!(md.contains("- one"));
/// assert_eq!(normalize_markdown(&md), md);
/// ```
pub fn normalize_markdown(content: &str) -> String {
    if looks_like_html(content) {
        let mut markdown = html2md::parse_html(content);
        while TAG.is_match(&markdown) {
            markdown = TAG.replace_all(&markdown, "").into_owned();
        }
        clean_markdown(&markdown)
    } else {
        clean_markdown(content)
    }
}

/// Cleans Markdown text without any HTML conversion
pub fn clean_markdown(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        let line = normalize_bullet(&collapse_spaces(raw));
        let trimmed = line.trim();

        if let Some(prefix) = setext_prefix(trimmed) {
            if let Some(previous) = lines.last_mut() {
                if is_setext_text(previous) {
                    *previous = format!("{} {}", prefix, previous.trim());
                    continue;
                }
            }
        }

        lines.push(line);
    }

    layout(lines)
}

/// Collapses space runs after the indentation and trims the line end
fn collapse_spaces(line: &str) -> String {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];
    let body = INNER_SPACES.replace_all(body.trim_end(), " ");
    if body.is_empty() {
        String::new()
    } else {
        format!("{}{}", indent, body)
    }
}

/// Rewrites `*` and `+` bullets to `-`
fn normalize_bullet(line: &str) -> String {
    let body = line.trim_start();
    if THEMATIC_BREAK.is_match(body) {
        return line.to_string();
    }

    match body.strip_prefix("* ").or_else(|| body.strip_prefix("+ ")) {
        Some(rest) => {
            let indent = &line[..line.len() - body.len()];
            format!("{}- {}", indent, rest)
        }
        None => line.to_string(),
    }
}

fn setext_prefix(trimmed: &str) -> Option<&'static str> {
    if SETEXT_H1.is_match(trimmed) {
        Some("#")
    } else if SETEXT_H2.is_match(trimmed) {
        Some("##")
    } else {
        None
    }
}

/// A line that a setext underline may turn into a heading
fn is_setext_text(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty()
        && !ATX_HEADING.is_match(trimmed)
        && !LIST_ITEM.is_match(trimmed)
        && !THEMATIC_BREAK.is_match(trimmed)
        && setext_prefix(trimmed).is_none()
}

fn is_heading(line: &str) -> bool {
    ATX_HEADING.is_match(line.trim_start())
}

/// Puts blank lines around headings and collapses blank runs
fn layout(lines: Vec<String>) -> String {
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut blank_pending = false;

    for line in lines {
        if line.is_empty() {
            blank_pending = true;
            continue;
        }

        let heading = is_heading(&line);
        if !out.is_empty() && (blank_pending || heading) {
            out.push(String::new());
        }
        out.push(line);
        blank_pending = heading;
    }

    out.join("\n")
}
