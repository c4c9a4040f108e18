//! Frontier expansion for listing pages
//!
//! A listing page (blog index, category page) is turned into the list of
//! content URLs it links to. Pages that are not listings expand to
//! themselves.

use crate::config::Config;
use crate::crawler::fetcher::{FetchMode, Fetcher};
use crate::crawler::parser::extract_filtered_links;
use crate::url::{is_listing_page, pagination_candidate, LinkFilter};
use std::collections::HashSet;
use url::Url;

/// Discovers child URLs of listing pages
#[derive(Clone)]
pub struct FrontierExpander {
    fetcher: Fetcher,
    listing_patterns: Vec<String>,
    skip_patterns: Vec<String>,
    pagination_templates: Vec<String>,
    max_pages: usize,
    link_threshold: usize,
}

/// Ordered, de-duplicated set of discovered URLs
#[derive(Debug, Default)]
struct Discovered {
    urls: Vec<Url>,
    seen: HashSet<Url>,
}

impl Discovered {
    /// Adds links and returns how many were new
    fn extend(&mut self, links: Vec<Url>) -> usize {
        let before = self.urls.len();
        for link in links {
            if self.seen.insert(link.clone()) {
                self.urls.push(link);
            }
        }
        self.urls.len() - before
    }
}

impl FrontierExpander {
    pub fn new(fetcher: Fetcher, config: &Config) -> Self {
        Self {
            fetcher,
            listing_patterns: config.filters.listing_patterns.clone(),
            skip_patterns: config.filters.skip_url_patterns.clone(),
            pagination_templates: config.filters.pagination_templates.clone(),
            max_pages: config.crawler.max_pages,
            link_threshold: config.crawler.link_threshold,
        }
    }

    /// Returns true if the URL would be expanded
    pub fn is_listing(&self, url: &Url) -> bool {
        is_listing_page(url, &self.listing_patterns)
    }

    /// Expands a seed URL into the content URLs it leads to
    ///
    /// # Steps
    ///
    /// 1. Non-listing seeds return `[seed]`
    /// 2. Links of the static page are collected through the link filter
    /// 3. Below the link threshold, links of the rendered page are added
    /// 4. Pagination candidates are probed page by page; probing stops at the
    ///    first page number with no existing candidate, when a page adds no
    ///    new links, or after `max-pages`
    ///
    /// Fetch failures are logged and expansion continues with what it has.
    pub async fn expand(&self, seed: &Url) -> Vec<Url> {
        if !self.is_listing(seed) {
            return vec![seed.clone()];
        }

        let filter = LinkFilter::new(seed, &self.skip_patterns);
        let mut discovered = Discovered::default();

        match self.fetcher.fetch(seed, FetchMode::Static).await {
            Ok(result) => {
                discovered.extend(extract_filtered_links(
                    &result.text(),
                    &result.final_url,
                    &filter,
                ));
            }
            Err(e) => tracing::warn!("Static fetch of listing {} failed: {}", seed, e),
        }

        if discovered.urls.len() < self.link_threshold && self.fetcher.can_render() {
            tracing::debug!(
                "Only {} links on {}, trying rendered page",
                discovered.urls.len(),
                seed
            );
            match self.fetcher.fetch(seed, FetchMode::Rendered).await {
                Ok(result) => {
                    let added = discovered.extend(extract_filtered_links(
                        &result.text(),
                        &result.final_url,
                        &filter,
                    ));
                    tracing::debug!("Rendered page of {} added {} links", seed, added);
                }
                Err(e) => tracing::warn!("Rendered fetch of listing {} failed: {}", seed, e),
            }
        }

        self.probe_pagination(seed, &filter, &mut discovered).await;

        tracing::info!("Expanded {} into {} URLs", seed, discovered.urls.len());
        discovered.urls
    }

    async fn probe_pagination(&self, seed: &Url, filter: &LinkFilter, discovered: &mut Discovered) {
        for n in 1..=self.max_pages {
            let mut existing = Vec::new();
            for template in &self.pagination_templates {
                if let Some(candidate) = pagination_candidate(seed, template, n) {
                    if self.fetcher.exists(&candidate).await {
                        existing.push(candidate);
                    }
                }
            }

            if existing.is_empty() {
                tracing::debug!("No pagination candidates exist for page {} of {}", n, seed);
                break;
            }

            let mut added = 0;
            for candidate in existing {
                match self.fetcher.fetch(&candidate, FetchMode::Static).await {
                    Ok(result) => {
                        added += discovered.extend(extract_filtered_links(
                            &result.text(),
                            &result.final_url,
                            filter,
                        ));
                    }
                    Err(e) => tracing::warn!("Pagination page {} failed: {}", candidate, e),
                }
            }

            if added == 0 {
                tracing::debug!("Page {} of {} added no new links", n, seed);
                break;
            }
        }
    }
}
