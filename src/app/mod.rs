//! Binary-side glue: file configuration and printed summaries.

pub mod config;
pub mod summary;
