//! Crawl scheduler
//!
//! This module drives a bounded breadth-first traversal:
//! - Claims batches of unvisited URLs from the frontier within the page budget
//! - Fetches each batch concurrently and waits for all of it
//! - Emits records for pages with enough content
//! - Enqueues same-site links that pass the link filter
//!
//! Results of a batch are processed in claim order, so a concurrent crawl
//! and a sequential crawl over the same site visit the same URLs in the
//! same order and produce the same records.

use crate::config::CrawlerConfig;
use crate::crawler::page::PageScraper;
use crate::crawler::parser::extract_filtered_links;
use crate::output::ContentRecord;
use crate::state::CrawlState;
use crate::url::{extract_domain, LinkFilter};
use futures::future::join_all;
use url::Url;

/// Result of one crawl invocation
#[derive(Debug, Clone, Default)]
pub struct CrawlOutcome {
    /// Records in emission order
    pub records: Vec<ContentRecord>,
    /// URLs claimed for fetching, in claim order
    pub visited: Vec<Url>,
    /// Number of URLs whose fetch failed
    pub failures: usize,
}

/// Bounded, de-duplicated crawl over one site
#[derive(Clone)]
pub struct Scheduler {
    scraper: PageScraper,
    skip_patterns: Vec<String>,
    max_concurrent: usize,
    page_budget: usize,
    follow_links: bool,
}

impl Scheduler {
    pub fn new(scraper: PageScraper, crawler: &CrawlerConfig, skip_patterns: &[String]) -> Self {
        Self {
            scraper,
            skip_patterns: skip_patterns.to_vec(),
            max_concurrent: crawler.max_concurrent.max(1),
            page_budget: crawler.max_pages,
            follow_links: crawler.follow_links,
        }
    }

    /// Crawls from the seeds, fetching up to `max-concurrent` pages at a time
    ///
    /// The first seed defines the site: discovered links are followed only
    /// when they share its host and port.
    pub async fn crawl(&self, seeds: &[Url], user_id: &str) -> CrawlOutcome {
        self.run(seeds, user_id, self.max_concurrent).await
    }

    /// Crawls from the seeds one page at a time
    pub async fn crawl_sequential(&self, seeds: &[Url], user_id: &str) -> CrawlOutcome {
        self.run(seeds, user_id, 1).await
    }

    async fn run(&self, seeds: &[Url], user_id: &str, batch_limit: usize) -> CrawlOutcome {
        let Some(first) = seeds.first() else {
            return CrawlOutcome::default();
        };

        let filter = LinkFilter::new(first, &self.skip_patterns);
        let mut state = CrawlState::new(
            extract_domain(first).unwrap_or_default(),
            self.page_budget,
        );
        for seed in seeds {
            state.enqueue(seed.clone());
        }

        let mut records = Vec::new();
        let mut failures = 0;

        while state.has_work() {
            let batch = state.claim_batch(batch_limit);
            if batch.is_empty() {
                break;
            }

            tracing::debug!(
                "Fetching batch of {} on {} ({} of {} pages claimed)",
                batch.len(),
                state.base_domain(),
                state.visited().len(),
                state.page_budget()
            );

            let results = join_all(batch.iter().map(|url| self.scraper.load(url))).await;

            for (url, result) in batch.iter().zip(results) {
                let page = match result {
                    Ok(page) => page,
                    Err(e) => {
                        tracing::warn!("Skipping {}: {}", url, e);
                        failures += 1;
                        continue;
                    }
                };

                if let Some(record) = self.scraper.to_record(&page, user_id) {
                    records.push(record);
                }

                if self.follow_links {
                    for link in extract_filtered_links(&page.html, &page.final_url, &filter) {
                        state.enqueue(link);
                    }
                }
            }
        }

        let visited = state.into_visited();
        tracing::info!(
            "Crawl finished: {} pages visited, {} records, {} failures",
            visited.len(),
            records.len(),
            failures
        );

        CrawlOutcome {
            records,
            visited,
            failures,
        }
    }
}
