use std::collections::{HashSet, VecDeque};
use url::Url;

/// Mutable state of a single crawl invocation
///
/// Owned by one scheduler run. URLs are claimed (marked visited) before
/// any fetch starts, so a URL can never be fetched twice even when a batch
/// runs concurrently.
#[derive(Debug, Clone)]
pub struct CrawlState {
    visited: HashSet<Url>,
    visit_order: Vec<Url>,
    frontier: VecDeque<Url>,
    queued: HashSet<Url>,
    page_budget: usize,
    base_domain: String,
}

impl CrawlState {
    /// Creates an empty state with the given budget
    pub fn new(base_domain: impl Into<String>, page_budget: usize) -> Self {
        Self {
            visited: HashSet::new(),
            visit_order: Vec::new(),
            frontier: VecDeque::new(),
            queued: HashSet::new(),
            page_budget,
            base_domain: base_domain.into(),
        }
    }

    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    pub fn page_budget(&self) -> usize {
        self.page_budget
    }

    /// Number of pages that may still be claimed
    pub fn remaining_budget(&self) -> usize {
        self.page_budget.saturating_sub(self.visited.len())
    }

    /// Returns true while there is both frontier and budget left
    pub fn has_work(&self) -> bool {
        !self.frontier.is_empty() && self.remaining_budget() > 0
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url)
    }

    /// Adds a URL to the back of the frontier
    ///
    /// # Returns
    ///
    /// `true` if the URL was queued, `false` if it was already visited or queued
    pub fn enqueue(&mut self, url: Url) -> bool {
        if self.is_visited(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.frontier.push_back(url);
        true
    }

    /// Claims the next batch of URLs for fetching
    ///
    /// Pops up to `min(limit, remaining_budget)` unvisited URLs from the front
    /// of the frontier and marks them visited before returning them.
    pub fn claim_batch(&mut self, limit: usize) -> Vec<Url> {
        let size = limit.min(self.remaining_budget());
        let mut batch = Vec::with_capacity(size);

        while batch.len() < size {
            let Some(url) = self.frontier.pop_front() else {
                break;
            };
            self.queued.remove(&url);

            if self.visited.insert(url.clone()) {
                self.visit_order.push(url.clone());
                batch.push(url);
            }
        }

        batch
    }

    /// Visited URLs in the order they were claimed
    pub fn visited(&self) -> &[Url] {
        &self.visit_order
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    /// Consumes the state and returns the visit order
    pub fn into_visited(self) -> Vec<Url> {
        self.visit_order
    }
}
