//! Pagination driver: walks one collection's search results page by page.
//!
//! For each search-result page the driver discovers listings, resolves their
//! images with the configured [`ResolveStrategy`], post-processes and writes
//! them, then follows the next-page link. It stops when the page cap is
//! reached, when a page has no next link, when a list page cannot be fetched,
//! or when the next link points back to a page already visited.
//!
//! Everything mutable lives in the caller's [`ScrapeSession`]; the driver
//! itself holds only the fetcher and immutable settings.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use harvester_core::batch::Collection;
//! use harvester_core::driver::{DriverSettings, PaginationDriver, ScrapeSession};
//! use harvester_core::fetch::PageFetcher;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = PaginationDriver::new(PageFetcher::new()?, DriverSettings::default());
//! let collection = Collection::new("white", "https://www.chinchillas.com/search/search_results.cfm?search_text=white");
//! let mut session = ScrapeSession::for_collection(&collection, Path::new("data"));
//! let report = driver.run(&collection, &mut session).await?;
//! println!("{} images, stopped: {}", report.images_written, report.stop_reason);
//! # Ok(())
//! # }
//! ```

mod error;
mod session;

pub use error::ScrapeError;
pub use session::{ScrapeSession, SourceKey};

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::batch::Collection;
use crate::fetch::PageFetcher;
use crate::item::ItemId;
use crate::listing::{SiteConventions, discover_listings};
use crate::output::OutputError;
use crate::page::ParsedPage;
use crate::process::{self, AcceptancePolicy};
use crate::resolver::{ImageCandidate, ResolveStrategy, detail_scan, pattern_guess};

/// Default pause after each image download attempt.
pub const DEFAULT_IMAGE_DELAY: Duration = Duration::from_millis(500);

/// Default pause after each detail page.
pub const DEFAULT_DETAIL_DELAY: Duration = Duration::from_millis(1000);

/// Default pause between search-result pages.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(2000);

/// Fixed pauses between requests. Zero disables a pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolitenessDelays {
    /// After each image candidate (or thumbnail id) is handled.
    pub image: Duration,
    /// After each detail page is handled.
    pub detail: Duration,
    /// Before fetching the next search-result page.
    pub page: Duration,
}

impl PolitenessDelays {
    /// No pauses at all; for tests and local mirrors.
    #[must_use]
    pub fn none() -> Self {
        Self {
            image: Duration::ZERO,
            detail: Duration::ZERO,
            page: Duration::ZERO,
        }
    }
}

impl Default for PolitenessDelays {
    fn default() -> Self {
        Self {
            image: DEFAULT_IMAGE_DELAY,
            detail: DEFAULT_DETAIL_DELAY,
            page: DEFAULT_PAGE_DELAY,
        }
    }
}

/// Immutable knobs for a driver.
#[derive(Debug, Clone, Default)]
pub struct DriverSettings {
    /// How images are located per listing.
    pub strategy: ResolveStrategy,
    /// Which downloads are kept and whether composites are split.
    pub policy: AcceptancePolicy,
    /// Pauses between requests.
    pub delays: PolitenessDelays,
    /// Maximum number of search-result pages to visit; `None` for all.
    pub max_pages: Option<u32>,
    /// Site URL conventions.
    pub conventions: SiteConventions,
}

/// Why a collection run ended. None of these is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopReason {
    /// The configured page cap was reached.
    PageCap,
    /// The last page had no next-page link.
    #[default]
    NoNextLink,
    /// A search-result page could not be fetched.
    ListFetchFailed,
    /// The next-page link pointed at a page already visited.
    RepeatedPage,
}

impl StopReason {
    /// Returns a short stable label for logs and summaries.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PageCap => "page cap reached",
            Self::NoNextLink => "no more pages",
            Self::ListFetchFailed => "search page fetch failed",
            Self::RepeatedPage => "next link repeats a visited page",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters for one completed collection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionReport {
    /// Search-result pages fetched (or attempted).
    pub pages_visited: u32,
    /// Detail pages (or thumbnail ids) handled.
    pub listings_visited: u32,
    /// Image URLs downloaded or attempted.
    pub candidates_tried: u32,
    /// Downloads rejected by the acceptance policy.
    pub rejected: u32,
    /// Files written.
    pub images_written: u32,
    /// Why the run ended.
    pub stop_reason: StopReason,
}

/// Sequential scraper for one collection at a time.
#[derive(Debug, Clone)]
pub struct PaginationDriver {
    fetcher: PageFetcher,
    settings: DriverSettings,
}

impl PaginationDriver {
    /// Creates a driver.
    #[must_use]
    pub fn new(fetcher: PageFetcher, settings: DriverSettings) -> Self {
        Self { fetcher, settings }
    }

    /// Scrapes `collection` from its seed URL into `session`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::InvalidSeedUrl`] when the seed URL does not
    /// parse and [`ScrapeError::Output`] when the output directory cannot be
    /// created. Network failures, rejected images and individual files that
    /// fail to write are logged and skipped.
    #[instrument(skip(self, collection, session), fields(collection = %collection.name))]
    pub async fn run(
        &self,
        collection: &Collection,
        session: &mut ScrapeSession,
    ) -> Result<CollectionReport, ScrapeError> {
        let mut page_url =
            Url::parse(collection.url.trim()).map_err(|_| ScrapeError::InvalidSeedUrl {
                collection: collection.name.clone(),
                url: collection.url.clone(),
            })?;

        info!(
            strategy = %self.settings.strategy,
            max_pages = ?self.settings.max_pages,
            output = %session.output().dir().display(),
            "starting collection"
        );

        let mut report = CollectionReport::default();
        let mut visited = HashSet::new();

        let stop_reason = loop {
            if self.page_cap_reached(report.pages_visited) {
                break StopReason::PageCap;
            }
            visited.insert(page_url.as_str().to_string());
            report.pages_visited += 1;
            info!(page = report.pages_visited, url = %page_url, "search results page");

            let body = match self.fetcher.fetch(&page_url).await {
                Ok(body) => body,
                Err(error) => {
                    warn!(error = %error, "search results page unavailable; stopping collection");
                    break StopReason::ListFetchFailed;
                }
            };
            let listing = discover_listings(
                &ParsedPage::parse(&body),
                &page_url,
                &self.settings.conventions,
            );

            match self.settings.strategy {
                ResolveStrategy::DetailScan => {
                    info!(listings = listing.detail_urls.len(), "found listings on page");
                    let total = listing.detail_urls.len();
                    for (index, detail_url) in listing.detail_urls.iter().enumerate() {
                        debug!(listing = index + 1, total, url = %detail_url, "visiting listing");
                        self.harvest_detail(detail_url, session, &mut report).await?;
                        pause(self.settings.delays.detail).await;
                    }
                }
                ResolveStrategy::PatternGuess => {
                    info!(thumbnails = listing.thumbnail_ids.len(), "found thumbnails on page");
                    for item in &listing.thumbnail_ids {
                        self.harvest_thumbnail(item, &page_url, session, &mut report)
                            .await?;
                        pause(self.settings.delays.image).await;
                    }
                }
            }

            let Some(next_url) = listing.next_url else {
                info!("no more search result pages");
                break StopReason::NoNextLink;
            };
            if visited.contains(next_url.as_str()) {
                warn!(url = %next_url, "next link points to a visited page; stopping collection");
                break StopReason::RepeatedPage;
            }
            if self.page_cap_reached(report.pages_visited) {
                break StopReason::PageCap;
            }

            pause(self.settings.delays.page).await;
            page_url = next_url;
        };

        report.stop_reason = stop_reason;
        report.images_written = session.written();
        info!(
            images = report.images_written,
            pages = report.pages_visited,
            rejected = report.rejected,
            reason = %report.stop_reason,
            output = %session.output().dir().display(),
            "collection complete"
        );
        Ok(report)
    }

    fn page_cap_reached(&self, pages_visited: u32) -> bool {
        self.settings
            .max_pages
            .is_some_and(|cap| pages_visited >= cap)
    }

    /// Detail-scan strategy for one listing.
    async fn harvest_detail(
        &self,
        detail_url: &Url,
        session: &mut ScrapeSession,
        report: &mut CollectionReport,
    ) -> Result<(), ScrapeError> {
        report.listings_visited += 1;

        let Some(item) = ItemId::from_detail_url(detail_url) else {
            debug!(url = %detail_url, "detail URL carries no item number; skipping");
            return Ok(());
        };

        let body = match self.fetcher.fetch(detail_url).await {
            Ok(body) => body,
            Err(error) => {
                warn!(error = %error, "detail page unavailable; skipping listing");
                return Ok(());
            }
        };
        let candidates =
            detail_scan::matching_images(&ParsedPage::parse(&body), detail_url, &item);

        let mut written = 0;
        for candidate in candidates {
            // Marked before downloading: a failed URL is not retried from a later page.
            if !session.mark_seen(SourceKey::Url(candidate.url.as_str().to_string())) {
                debug!(url = %candidate.url, "image already attempted");
                continue;
            }
            written += self.download_candidate(&candidate, session, report).await?;
            pause(self.settings.delays.image).await;
        }

        if written == 0 {
            info!(item = %item, "no full images found");
        }
        Ok(())
    }

    /// Pattern-guess strategy for one thumbnail id; stops at the first candidate that yields output.
    async fn harvest_thumbnail(
        &self,
        item: &ItemId,
        page_url: &Url,
        session: &mut ScrapeSession,
        report: &mut CollectionReport,
    ) -> Result<(), ScrapeError> {
        if !session.mark_seen(SourceKey::Item(item.clone())) {
            debug!(item = %item, "thumbnail id already attempted");
            return Ok(());
        }
        report.listings_visited += 1;

        for candidate in pattern_guess::candidate_urls(page_url, item) {
            if self.download_candidate(&candidate, session, report).await? > 0 {
                return Ok(());
            }
        }
        info!(item = %item, "no candidate URL produced an image");
        Ok(())
    }

    /// Downloads, vets and writes one candidate. Returns the number of files written.
    async fn download_candidate(
        &self,
        candidate: &ImageCandidate,
        session: &mut ScrapeSession,
        report: &mut CollectionReport,
    ) -> Result<u32, ScrapeError> {
        report.candidates_tried += 1;
        debug!(
            url = %candidate.url,
            target = %session.output().next_path().display(),
            "downloading image"
        );

        let body = match self.fetcher.fetch(&candidate.url).await {
            Ok(body) => body,
            Err(error) => {
                debug!(error = %error, "image unavailable");
                return Ok(0);
            }
        };

        let prepared = match process::prepare(&body, &self.settings.policy) {
            Ok(prepared) => prepared,
            Err(rejection) => {
                report.rejected += 1;
                info!(url = %candidate.url, reason = %rejection, "image rejected");
                return Ok(0);
            }
        };

        let mut saved = 0;
        for tile in &prepared.tiles {
            let jpeg = match process::encode_jpeg(tile) {
                Ok(jpeg) => jpeg,
                Err(error) => {
                    warn!(url = %candidate.url, error = %error, "JPEG encoding failed; tile dropped");
                    continue;
                }
            };
            let path = match session.output_mut().save(&jpeg).await {
                Ok(path) => path,
                Err(error @ OutputError::CreateDir { .. }) => return Err(error.into()),
                Err(error @ OutputError::Write { .. }) => {
                    warn!(url = %candidate.url, error = %error, "image not written; tile dropped");
                    continue;
                }
            };
            saved += 1;
            info!(
                file = %path.display(),
                width = tile.width(),
                height = tile.height(),
                source_kb = prepared.bytes / 1024,
                item = %candidate.item,
                "image saved"
            );
        }
        if prepared.was_split() {
            debug!(
                url = %candidate.url,
                tiles = prepared.tiles.len(),
                "composite split into tiles"
            );
        }
        Ok(saved)
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
