//! Integration tests for Sumi-Harvest
//!
//! All tests run against wiremock servers with a no-op sleeper and no
//! headless browser.

mod common;
mod crawl_tests;
mod dispatch_tests;
mod frontier_tests;
mod pdf_tests;
