//! HTTP fetcher for search-result pages, detail pages and image bodies.
//!
//! # Example
//!
//! ```no_run
//! use harvester_core::fetch::PageFetcher;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = PageFetcher::new()?;
//! let body = fetcher.fetch_str("https://example.com/search").await?;
//! println!("{} bytes", body.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::PageFetcher;
pub use error::FetchError;

/// Constants for the fetch module.
pub mod constants {
    /// Whole-request timeout in seconds.
    pub const TIMEOUT_SECS: u64 = 15;
}
