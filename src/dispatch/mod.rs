//! URL routing and the top-level harvest loop
//!
//! Every input URL is routed once to one of a fixed set of pipelines. The
//! order of the checks matters: Drive links are recognised before PDF
//! links, and PDF links before listing pages.

use crate::config::Config;
use crate::crawler::{
    build_http_client, FetchSettings, Fetcher, FrontierExpander, PageScraper, Renderer, Scheduler,
    Sleeper, TokioSleeper,
};
use crate::drive::{DriveResolver, GoogleDriveResolver};
use crate::extract::{Classifier, ContentExtractor};
use crate::output::ContentRecord;
use crate::pdf::{PdfExtractText, PdfPipeline, TextExtractor};
use crate::url::{host_matches_any, is_listing_page, is_pdf_url, parse_http_url};
use crate::{HarvestError, Result};
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Pipeline chosen for an input URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Drive share link, resolved to direct PDF downloads
    Drive,
    /// PDF document
    Pdf,
    /// Listing page, expanded and crawled
    Listing,
    /// Single content page
    Page,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Route::Drive => "drive",
            Route::Pdf => "pdf",
            Route::Listing => "listing",
            Route::Page => "page",
        };
        write!(f, "{}", name)
    }
}

/// Routes a URL to its pipeline
///
/// # Examples
///
/// ```
/// use sumi_harvest::{route, Config, Route};
/// use url::Url;
///
/// let config = Config::default();
/// let url = Url::parse("https://drive.google.com/file/d/abc/view").unwrap();
/// assert_eq!(route(&url, &config), Route::Drive);
///
/// let url = Url::parse("https://example.com/blog/whitepaper.pdf").unwrap();
/// assert_eq!(route(&url, &config), Route::Pdf);
///
/// let url = Url::parse("https://example.com/blog").unwrap();
/// assert_eq!(route(&url, &config), Route::Listing);
/// ```
pub fn route(url: &Url, config: &Config) -> Route {
    if host_matches_any(url, &config.drive.domains) {
        Route::Drive
    } else if is_pdf_url(url) {
        Route::Pdf
    } else if is_listing_page(url, &config.filters.listing_patterns) {
        Route::Listing
    } else {
        Route::Page
    }
}

/// Builder for [`Harvester`]
///
/// Collaborators that are not set explicitly get their production
/// implementations, except the renderer: without one, pages are only
/// fetched statically.
pub struct HarvesterBuilder {
    config: Config,
    sleeper: Option<Arc<dyn Sleeper>>,
    renderer: Option<Arc<dyn Renderer>>,
    text_extractor: Option<Arc<dyn TextExtractor>>,
    drive_resolver: Option<Arc<dyn DriveResolver>>,
}

impl HarvesterBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sleeper: None,
            renderer: None,
            text_extractor: None,
            drive_resolver: None,
        }
    }

    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = Some(sleeper);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn text_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.text_extractor = Some(extractor);
        self
    }

    pub fn drive_resolver(mut self, resolver: Arc<dyn DriveResolver>) -> Self {
        self.drive_resolver = Some(resolver);
        self
    }

    /// Wires the pipelines together
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to harvest
    /// * `Err(HarvestError)` - Invalid selectors or HTTP client setup failure
    pub fn build(self) -> Result<Harvester> {
        let config = self.config;
        let client = build_http_client(&config.crawler)?;
        let sleeper = self.sleeper.unwrap_or_else(|| Arc::new(TokioSleeper));

        let mut fetcher = Fetcher::new(
            client.clone(),
            FetchSettings::from_config(&config.crawler),
            Arc::clone(&sleeper),
        );
        if let Some(renderer) = self.renderer {
            fetcher = fetcher.with_renderer(renderer);
        }

        let extractor = Arc::new(ContentExtractor::from_config(
            &config.selectors,
            &config.filters,
        )?);
        let classifier = Arc::new(Classifier::new(&config.content_type_table()));

        let scraper = PageScraper::new(
            fetcher.clone(),
            extractor,
            classifier,
            config.filters.min_content_length,
        );
        let scheduler = Scheduler::new(
            scraper.clone(),
            &config.crawler,
            &config.filters.skip_url_patterns,
        );
        let frontier = FrontierExpander::new(fetcher, &config);

        let pdf = PdfPipeline::new(
            client.clone(),
            sleeper,
            self.text_extractor
                .unwrap_or_else(|| Arc::new(PdfExtractText)),
            config.pdf.clone(),
            config.crawler.request_timeout(),
        )
        .with_min_content_length(config.filters.min_content_length);

        let drive = self
            .drive_resolver
            .unwrap_or_else(|| Arc::new(GoogleDriveResolver::new(client)));

        Ok(Harvester {
            config,
            scraper,
            scheduler,
            frontier,
            pdf,
            drive,
        })
    }
}

/// Harvests records from a list of input URLs
pub struct Harvester {
    config: Config,
    scraper: PageScraper,
    scheduler: Scheduler,
    frontier: FrontierExpander,
    pdf: PdfPipeline,
    drive: Arc<dyn DriveResolver>,
}

impl Harvester {
    pub fn builder(config: Config) -> HarvesterBuilder {
        HarvesterBuilder::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Harvests every input URL and merges the records
    ///
    /// Invalid inputs and per-URL failures are logged and skipped. Records
    /// already emitted for the same `(source_url, chunk_index)` are dropped.
    ///
    /// # Returns
    ///
    /// * `Ok(records)` - Merged records in input order
    /// * `Err(HarvestError)` - A process-wide failure such as a browser crash
    pub async fn harvest(&self, urls: &[String], user_id: &str) -> Result<Vec<ContentRecord>> {
        let mut records = Vec::new();
        let mut seen = HashSet::new();

        for (i, input) in urls.iter().enumerate() {
            let url = match parse_http_url(input) {
                Ok(url) => url,
                Err(e) => {
                    let err = HarvestError::InvalidUrl {
                        url: input.clone(),
                        reason: e.to_string(),
                    };
                    tracing::warn!("Skipping input: {}", err);
                    continue;
                }
            };

            tracing::info!("Processing URL {}/{}: {}", i + 1, urls.len(), url);

            match self.harvest_url(&url, user_id).await {
                Ok(harvested) => {
                    let before = records.len();
                    for record in harvested {
                        if seen.insert(record.dedup_key()) {
                            records.push(record);
                        }
                    }
                    tracing::info!("{} yielded {} new records", url, records.len() - before);
                }
                Err(e) if e.is_per_url() => tracing::warn!("Failed to harvest {}: {}", url, e),
                Err(e) => return Err(e),
            }
        }

        Ok(records)
    }

    /// Runs the pipeline chosen by [`route`] for one URL
    pub async fn harvest_url(&self, url: &Url, user_id: &str) -> Result<Vec<ContentRecord>> {
        let route = route(url, &self.config);
        tracing::debug!("Routing {} to {} pipeline", url, route);

        match route {
            Route::Drive => self.harvest_drive(url, user_id).await,
            Route::Pdf => self.pdf.scrape_pdf(url, user_id).await,
            Route::Listing => {
                let mut seeds = self.frontier.expand(url).await;
                if seeds.is_empty() {
                    seeds.push(url.clone());
                }
                let outcome = self.scheduler.crawl(&seeds, user_id).await;
                Ok(outcome.records)
            }
            Route::Page => Ok(self.scraper.scrape(url, user_id).await?.into_iter().collect()),
        }
    }

    async fn harvest_drive(&self, url: &Url, user_id: &str) -> Result<Vec<ContentRecord>> {
        let resolved = self.drive.resolve(url).await?;
        tracing::info!("Resolved {} into {} download URLs", url, resolved.len());

        let mut records = Vec::new();
        for target in resolved {
            let target = match parse_http_url(&target) {
                Ok(target) if target != *url => target,
                Ok(_) => {
                    tracing::debug!("Skipping resolved URL equal to its source: {}", url);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Resolved URL {} is invalid: {}", target, e);
                    continue;
                }
            };

            match self.pdf.scrape_pdf(&target, user_id).await {
                Ok(chunks) => records.extend(chunks),
                Err(e) if e.is_per_url() => tracing::warn!("Failed to harvest {}: {}", target, e),
                Err(e) => return Err(e),
            }
        }

        Ok(records)
    }
}
