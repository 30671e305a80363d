//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use harvester_core::{AcceptancePreset, ResolveStrategy};

/// Page cap applied by `--test`.
pub const TEST_MODE_PAGES: u32 = 2;

/// Default label for `single` runs.
pub const DEFAULT_LABEL: &str = "chinchilla";

/// Scrape listing photographs from classified-ads search results.
///
/// Harvester pages through search results, resolves each listing's
/// full-size images and writes them as numbered JPEGs per collection.
#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: $XDG_CONFIG_HOME/harvester/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape every configured collection in turn
    Batch(BatchArgs),
    /// Scrape one collection from a search-results URL
    Single(SingleArgs),
    /// List configured collections without touching the network
    Collections(CollectionsArgs),
}

/// Arguments for `harvester batch`.
#[derive(clap::Args, Debug)]
pub struct BatchArgs {
    /// JSON file with collections (default: built-in list)
    #[arg(long, value_name = "FILE")]
    pub collections: Option<PathBuf>,

    /// Only run the named collections (repeatable)
    #[arg(long, value_name = "NAME")]
    pub only: Vec<String>,

    #[command(flatten)]
    pub run: RunOptions,
}

/// Arguments for `harvester single`.
#[derive(clap::Args, Debug)]
pub struct SingleArgs {
    /// Search-results URL to start from
    #[arg(long, value_name = "URL")]
    pub url: String,

    /// Collection label: output directory name and file prefix
    #[arg(long, value_name = "NAME", default_value = DEFAULT_LABEL)]
    pub label: String,

    #[command(flatten)]
    pub run: RunOptions,
}

/// Arguments for `harvester collections`.
#[derive(clap::Args, Debug)]
pub struct CollectionsArgs {
    /// JSON file with collections (default: built-in list)
    #[arg(long, value_name = "FILE")]
    pub collections: Option<PathBuf>,
}

/// Options shared by the scraping commands. Unset values fall back to the
/// config file, then to built-in defaults.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunOptions {
    /// Maximum search-result pages per collection
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..), conflicts_with = "test")]
    pub max_pages: Option<u32>,

    /// Test mode: stop after 2 search-result pages per collection
    #[arg(long)]
    pub test: bool,

    /// Root directory for collection output
    #[arg(long, value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    /// Image resolution strategy: detail-scan or pattern-guess
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<ResolveStrategy>,

    /// Acceptance thresholds: lenient or strict
    #[arg(long, value_name = "PRESET")]
    pub acceptance: Option<AcceptancePreset>,

    /// Keep stacked composite images whole instead of splitting them
    #[arg(long)]
    pub no_split: bool,
}

impl RunOptions {
    /// Page cap requested on the command line, if any.
    #[must_use]
    pub fn page_cap(&self) -> Option<u32> {
        if self.test {
            Some(TEST_MODE_PAGES)
        } else {
            self.max_pages
        }
    }
}
