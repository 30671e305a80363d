//! Batch driver: runs the pagination driver over a list of collections.
//!
//! Each collection is isolated: an error, a panic or an interrupt inside one
//! collection is recorded as that collection's outcome and the batch moves on
//! to the next one. A fixed pause separates collections.

mod collection;

pub use collection::{Collection, CollectionsError, default_collections, load_collections};

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures_util::FutureExt;
use tracing::{info, instrument, warn};

use crate::driver::{CollectionReport, PaginationDriver, ScrapeError, ScrapeSession};

/// Default pause between two collections.
pub const DEFAULT_COLLECTION_DELAY: Duration = Duration::from_secs(5);

/// Default output root directory.
pub const DEFAULT_OUTPUT_ROOT: &str = "data";

/// Anything that can scrape one collection into a session.
///
/// [`PaginationDriver`] is the production implementation; tests substitute
/// their own.
#[async_trait]
pub trait CollectionScraper: Send + Sync {
    /// Scrapes `collection`, writing through `session`.
    async fn scrape(
        &self,
        collection: &Collection,
        session: &mut ScrapeSession,
    ) -> Result<CollectionReport, ScrapeError>;
}

#[async_trait]
impl CollectionScraper for PaginationDriver {
    async fn scrape(
        &self,
        collection: &Collection,
        session: &mut ScrapeSession,
    ) -> Result<CollectionReport, ScrapeError> {
        self.run(collection, session).await
    }
}

/// How one collection ended.
#[derive(Debug)]
pub enum CollectionOutcome {
    /// The driver finished normally.
    Completed(CollectionReport),
    /// The driver returned an error or panicked.
    Failed {
        /// Error or panic message.
        error: String,
        /// Files written before the failure.
        written: u32,
    },
    /// The run was interrupted; `written` files were kept.
    Interrupted {
        /// Files written before the interrupt.
        written: u32,
    },
    /// The collection has no seed URL.
    Skipped,
}

impl CollectionOutcome {
    /// Image count credited to the collection. Failed collections count as zero.
    #[must_use]
    pub fn images(&self) -> u32 {
        match self {
            Self::Completed(report) => report.images_written,
            Self::Interrupted { written } => *written,
            Self::Failed { .. } | Self::Skipped => 0,
        }
    }

    /// Short status label.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed(_) => "completed",
            Self::Failed { .. } => "failed",
            Self::Interrupted { .. } => "interrupted",
            Self::Skipped => "skipped",
        }
    }
}

/// Result for one collection of a batch.
#[derive(Debug)]
pub struct CollectionResult {
    /// Collection name.
    pub name: String,
    /// How it ended.
    pub outcome: CollectionOutcome,
    /// Time spent on this collection.
    pub elapsed: Duration,
}

/// Results of a whole batch, in collection order.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One entry per input collection.
    pub results: Vec<CollectionResult>,
    /// Wall time of the batch, pauses included.
    pub elapsed: Duration,
}

impl BatchReport {
    /// Sum of [`CollectionOutcome::images`] over all collections.
    #[must_use]
    pub fn total_images(&self) -> u32 {
        self.results.iter().map(|r| r.outcome.images()).sum()
    }

    /// Result for the named collection.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CollectionResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

/// Runs collections one after another.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    output_root: PathBuf,
    collection_delay: Duration,
}

impl BatchRunner {
    /// Creates a runner writing under `output_root`.
    #[must_use]
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
            collection_delay: DEFAULT_COLLECTION_DELAY,
        }
    }

    /// Sets the pause between collections.
    #[must_use]
    pub fn with_collection_delay(mut self, delay: Duration) -> Self {
        self.collection_delay = delay;
        self
    }

    /// Output root directory.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Runs every collection with `scraper`.
    ///
    /// `interrupt` is called once per collection and must return a future
    /// that resolves when the user asks to abort it (for example
    /// `tokio::signal::ctrl_c`). Only the running collection is aborted.
    #[instrument(skip_all, fields(collections = collections.len()))]
    pub async fn run<S, I, F>(
        &self,
        scraper: &S,
        collections: &[Collection],
        mut interrupt: I,
    ) -> BatchReport
    where
        S: CollectionScraper + ?Sized,
        I: FnMut() -> F,
        F: Future<Output = ()>,
    {
        let started = Instant::now();
        let mut results = Vec::with_capacity(collections.len());
        let mut scraped_any = false;

        for (index, collection) in collections.iter().enumerate() {
            if !collection.has_url() {
                info!(collection = %collection.name, "skipping collection without URL");
                results.push(CollectionResult {
                    name: collection.name.clone(),
                    outcome: CollectionOutcome::Skipped,
                    elapsed: Duration::ZERO,
                });
                continue;
            }

            if scraped_any && !self.collection_delay.is_zero() {
                info!(seconds = self.collection_delay.as_secs_f32(), "waiting before next collection");
                tokio::select! {
                    () = tokio::time::sleep(self.collection_delay) => {}
                    () = interrupt() => warn!("interrupted during pause; continuing with next collection"),
                }
            }
            scraped_any = true;

            info!(
                collection = %collection.name,
                position = index + 1,
                total = collections.len(),
                "starting collection"
            );
            let collection_started = Instant::now();
            let mut session = ScrapeSession::for_collection(collection, &self.output_root);

            let finished = tokio::select! {
                result = AssertUnwindSafe(scraper.scrape(collection, &mut session)).catch_unwind() => Some(result),
                () = interrupt() => None,
            };

            let written = session.written();
            let outcome = match finished {
                Some(Ok(Ok(report))) => CollectionOutcome::Completed(report),
                Some(Ok(Err(error))) => {
                    warn!(collection = %collection.name, error = %error, written, "collection failed");
                    CollectionOutcome::Failed {
                        error: error.to_string(),
                        written,
                    }
                }
                Some(Err(panic)) => {
                    let error = panic_message(&*panic);
                    warn!(collection = %collection.name, error = %error, written, "collection panicked");
                    CollectionOutcome::Failed { error, written }
                }
                None => {
                    warn!(collection = %collection.name, written, "collection interrupted");
                    CollectionOutcome::Interrupted { written }
                }
            };

            results.push(CollectionResult {
                name: collection.name.clone(),
                outcome,
                elapsed: collection_started.elapsed(),
            });
        }

        let report = BatchReport {
            results,
            elapsed: started.elapsed(),
        };
        info!(
            images = report.total_images(),
            elapsed_secs = report.elapsed.as_secs(),
            "batch complete"
        );
        report
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use tempfile::TempDir;

    use super::*;
    use crate::driver::StopReason;

    /// Writes `images` fake files per collection, failing or panicking on request.
    struct FakeScraper {
        fail: &'static str,
        panic: &'static str,
        calls: Mutex<Vec<String>>,
    }

    impl FakeScraper {
        fn new() -> Self {
            Self {
                fail: "",
                panic: "",
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CollectionScraper for FakeScraper {
        async fn scrape(
            &self,
            collection: &Collection,
            session: &mut ScrapeSession,
        ) -> Result<CollectionReport, ScrapeError> {
            self.calls.lock().unwrap().push(collection.name.clone());
            assert!(collection.name != self.panic, "boom in {}", collection.name);
            session.output_mut().save(b"jpeg").await?;
            if collection.name == self.fail {
                return Err(ScrapeError::InvalidSeedUrl {
                    collection: collection.name.clone(),
                    url: collection.url.clone(),
                });
            }
            Ok(CollectionReport {
                images_written: session.written(),
                stop_reason: StopReason::NoNextLink,
                ..CollectionReport::default()
            })
        }
    }

    fn three() -> Vec<Collection> {
        ["a", "b", "c"]
            .into_iter()
            .map(|name| Collection::new(name, format!("https://example.com/{name}")))
            .collect()
    }

    fn runner(temp: &TempDir) -> BatchRunner {
        BatchRunner::new(temp.path()).with_collection_delay(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_error_in_one_collection_does_not_stop_batch() {
        let temp = TempDir::new().unwrap();
        let scraper = FakeScraper {
            fail: "b",
            ..FakeScraper::new()
        };

        let report = runner(&temp)
            .run(&scraper, &three(), std::future::pending::<()>)
            .await;

        assert_eq!(*scraper.calls.lock().unwrap(), ["a", "b", "c"]);
        assert!(matches!(report.get("b").unwrap().outcome, CollectionOutcome::Failed { written: 1, .. }));
        assert_eq!(report.get("b").unwrap().outcome.images(), 0);
        assert_eq!(report.get("c").unwrap().outcome.images(), 1);
        assert_eq!(report.total_images(), 2);
    }

    #[tokio::test]
    async fn test_panic_in_one_collection_does_not_stop_batch() {
        let temp = TempDir::new().unwrap();
        let scraper = FakeScraper {
            panic: "b",
            ..FakeScraper::new()
        };

        let report = runner(&temp)
            .run(&scraper, &three(), std::future::pending::<()>)
            .await;

        let b = &report.get("b").unwrap().outcome;
        match b {
            CollectionOutcome::Failed { error, written } => {
                assert!(error.contains("boom in b"), "got: {error}");
                assert_eq!(*written, 0);
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(matches!(report.get("c").unwrap().outcome, CollectionOutcome::Completed(_)));
    }

    #[tokio::test]
    async fn test_skips_collection_without_url() {
        let temp = TempDir::new().unwrap();
        let scraper = FakeScraper::new();
        let collections = vec![
            Collection::new("a", "https://example.com/a"),
            Collection::new("empty", ""),
        ];

        let report = runner(&temp)
            .run(&scraper, &collections, std::future::pending::<()>)
            .await;

        assert_eq!(*scraper.calls.lock().unwrap(), ["a"]);
        assert!(matches!(report.get("empty").unwrap().outcome, CollectionOutcome::Skipped));
        assert_eq!(report.results.len(), 2);
    }

    #[tokio::test]
    async fn test_immediate_interrupt_marks_each_collection_interrupted() {
        let temp = TempDir::new().unwrap();
        let scraper = FakeScraper::new();

        let report = runner(&temp)
            .run(&scraper, &three(), || std::future::ready(()))
            .await;

        assert_eq!(report.results.len(), 3);
        for result in &report.results {
            assert!(
                matches!(result.outcome, CollectionOutcome::Interrupted { .. }),
                "{}: {:?}",
                result.name,
                result.outcome
            );
        }
    }

    #[test]
    fn test_panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&"owned".to_string()), "owned");
        assert_eq!(panic_message(&42_u8), "unknown panic");
    }
}
