//! Content extraction module for Sumi-Harvest
//!
//! This module turns raw HTML into the pieces a record is built from:
//! - [`ContentExtractor`] picks title, main content and author by ordered selectors
//! - [`Classifier`] maps a page to a [`ContentType`]
//! - [`normalize_markdown`] turns extracted HTML into cleaned Markdown

mod classify;
mod markdown;

pub use classify::{Classifier, ContentType};
pub use markdown::{clean_markdown, looks_like_html, normalize_markdown};

use crate::config::{FilterConfig, SelectorConfig};
use crate::{ConfigError, ConfigResult};
use scraper::{ElementRef, Html, Selector};

/// Pieces extracted from one HTML page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedPage {
    /// First title candidate within the length bounds, or empty
    pub title: String,
    /// Outer HTML of the main content block, or empty
    pub content_html: String,
    /// Author name, or empty
    pub author: String,
}

impl ExtractedPage {
    /// Returns true if no main content was found
    pub fn is_empty(&self) -> bool {
        self.content_html.trim().is_empty()
    }
}

/// Selector-priority content extractor
///
/// Selectors are parsed once at construction; every list is tried in
/// configuration order and the first acceptable match wins.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    title: Vec<Selector>,
    content: Vec<Selector>,
    author: Vec<Selector>,
    strip: Vec<Selector>,
    body: Selector,
    min_content_length: usize,
    min_title_length: usize,
    max_title_length: usize,
}

impl ContentExtractor {
    /// Builds an extractor from the selector and filter configuration
    ///
    /// # Returns
    ///
    /// * `Ok(ContentExtractor)` - All selectors parsed
    /// * `Err(ConfigError::InvalidSelector)` - A selector failed to parse
    pub fn from_config(selectors: &SelectorConfig, filters: &FilterConfig) -> ConfigResult<Self> {
        Ok(Self {
            title: parse_selectors(&selectors.title)?,
            content: parse_selectors(&selectors.content)?,
            author: parse_selectors(&selectors.author)?,
            strip: parse_selectors(&selectors.strip)?,
            body: parse_selector("body")?,
            min_content_length: filters.min_content_length,
            min_title_length: filters.min_title_length,
            max_title_length: filters.max_title_length,
        })
    }

    /// Extracts title, main content and author from an HTML document
    ///
    /// Elements matching the strip selectors are removed first.
    pub fn extract(&self, html: &str) -> ExtractedPage {
        let mut document = Html::parse_document(html);
        self.strip_elements(&mut document);

        ExtractedPage {
            title: self.extract_title(&document),
            content_html: self.extract_content(&document),
            author: self.extract_author(&document),
        }
    }

    fn strip_elements(&self, document: &mut Html) {
        let ids: Vec<_> = self
            .strip
            .iter()
            .flat_map(|selector| select_all(document, selector).map(|el| el.id()))
            .collect();

        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }

    /// Ordered first-match: the first element of each selector is tried in
    /// turn and the first one within the length bounds is taken
    fn extract_title(&self, document: &Html) -> String {
        for selector in &self.title {
            if let Some(element) = select_first(document, selector) {
                let title = collapse_whitespace(&element_text(&element));
                let len = title.chars().count();
                if len >= self.min_title_length && len <= self.max_title_length {
                    return title;
                }
            }
        }
        String::new()
    }

    fn extract_content(&self, document: &Html) -> String {
        for selector in &self.content {
            if let Some(element) = select_first(document, selector) {
                if element_text(&element).trim().chars().count() > self.min_content_length {
                    return element.html();
                }
            }
        }

        select_first(document, &self.body)
            .filter(|body| !element_text(body).trim().is_empty())
            .map(|body| body.html())
            .unwrap_or_default()
    }

    fn extract_author(&self, document: &Html) -> String {
        for selector in &self.author {
            if let Some(element) = select_first(document, selector) {
                let author = if element.value().name() == "meta" {
                    element.value().attr("content").unwrap_or_default().to_string()
                } else {
                    element_text(&element)
                };

                let author = collapse_whitespace(&author);
                if !author.is_empty() {
                    return author;
                }
            }
        }
        String::new()
    }
}

fn parse_selector(selector: &str) -> ConfigResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}

fn parse_selectors(selectors: &[String]) -> ConfigResult<Vec<Selector>> {
    selectors.iter().map(|s| parse_selector(s)).collect()
}

/// Selects only elements still attached to the document tree
fn select_all<'a, 'b>(
    document: &'a Html,
    selector: &'b Selector,
) -> scraper::element_ref::Select<'a, 'b> {
    document.root_element().select(selector)
}

fn select_first<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    select_all(document, selector).next()
}

fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
