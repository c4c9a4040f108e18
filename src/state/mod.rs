//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: visited set, frontier queue and page budget of one crawl

mod crawl_state;

pub use crawl_state::CrawlState;
