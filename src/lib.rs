//! Harvester Core Library
//!
//! This library scrapes listing photographs from a classified-ads site:
//! it pages through search results, resolves each listing's full-size
//! images, vets and optionally splits them, and writes numbered JPEGs per
//! collection.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`fetch`] - HTTP GET client with fixed identity and timeout
//! - [`page`] - HTML parsing into anchors and image sources
//! - [`item`] - Numeric item identifiers
//! - [`listing`] - Detail-link and next-page discovery on search pages
//! - [`resolver`] - Full-size image resolution strategies
//! - [`process`] - Image decoding, acceptance gates, splitting and encoding
//! - [`output`] - Sequentially numbered output files
//! - [`driver`] - Pagination driver for one collection
//! - [`batch`] - Batch driver over many collections

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod batch;
pub mod driver;
pub mod fetch;
pub mod item;
pub mod listing;
pub mod output;
pub mod page;
pub mod process;
pub mod resolver;
pub mod user_agent;

// Re-export commonly used types
pub use batch::{
    BatchReport, BatchRunner, Collection, CollectionOutcome, CollectionScraper, default_collections,
    load_collections,
};
pub use driver::{
    CollectionReport, DriverSettings, PaginationDriver, PolitenessDelays, ScrapeError,
    ScrapeSession, StopReason,
};
pub use fetch::{FetchError, PageFetcher};
pub use item::ItemId;
pub use process::{AcceptancePolicy, AcceptancePreset, Rejection, SplitPolicy};
pub use resolver::ResolveStrategy;
pub use user_agent::{DEFAULT_USER_AGENT, resolve_user_agent};
