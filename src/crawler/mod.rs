//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Static and rendered fetching with retry logic
//! - HTML link extraction
//! - Single-page scraping with static-to-rendered escalation
//! - Listing-page expansion and pagination probing
//! - Batch scheduling over a bounded frontier

mod delay;
mod fetcher;
mod frontier;
mod page;
mod parser;
mod render;
mod scheduler;

pub use delay::{linear_backoff, politeness_delay, Sleeper, TokioSleeper};
pub use fetcher::{build_http_client, FetchMode, FetchResult, FetchSettings, Fetcher};
pub use frontier::FrontierExpander;
pub use page::{LoadedPage, PageScraper};
pub use parser::{extract_filtered_links, extract_links};
pub use render::{ChromeRenderer, Renderer};
pub use scheduler::{CrawlOutcome, Scheduler};
