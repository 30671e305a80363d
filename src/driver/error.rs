//! Errors that abort one collection run.
//!
//! Fetch failures and rejections never get here: they skip the affected page,
//! listing or image and the run carries on.

use thiserror::Error;

use crate::output::OutputError;

/// Error type for a collection run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The collection's seed URL is not an absolute URL.
    #[error("invalid seed URL for collection '{collection}': {url}")]
    InvalidSeedUrl {
        /// Collection name.
        collection: String,
        /// The offending URL.
        url: String,
    },

    /// Writing output failed.
    #[error("output error: {0}")]
    Output(#[from] OutputError),
}
