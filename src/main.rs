//! CLI entry point for the harvester tool.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use harvester_core::batch::DEFAULT_OUTPUT_ROOT;
use harvester_core::{
    BatchRunner, Collection, PageFetcher, PaginationDriver, default_collections, load_collections,
};
use tracing::{debug, info, warn};
use url::Url;

mod app;
mod cli;

use app::config::{RunConfig, load_file_config};
use app::summary::{render_batch_summary, render_collections};
use cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let file_config = load_file_config(args.config.as_deref())?;
    debug!(?file_config, "file configuration loaded");

    match args.command {
        Command::Collections(cmd) => {
            let collections = select_collections(cmd.collections.as_deref(), &[])?;
            let output_root = file_config
                .output_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT));
            println!("{}", render_collections(&collections, &output_root));
        }
        Command::Batch(cmd) => {
            let collections = select_collections(cmd.collections.as_deref(), &cmd.only)?;
            let run = RunConfig::resolve(&cmd.run, &file_config);
            run_collections(&run, &collections).await?;
        }
        Command::Single(cmd) => {
            Url::parse(cmd.url.trim())
                .with_context(|| format!("Invalid search-results URL '{}'", cmd.url))?;
            let collection = Collection::new(cmd.label, cmd.url);
            let run = RunConfig::resolve(&cmd.run, &file_config);
            run_collections(&run, std::slice::from_ref(&collection)).await?;
        }
    }

    Ok(())
}

/// Built-in or file collections, narrowed to `only` when given.
fn select_collections(file: Option<&Path>, only: &[String]) -> Result<Vec<Collection>> {
    let collections = match file {
        Some(path) => load_collections(path)?,
        None => default_collections(),
    };
    if only.is_empty() {
        return Ok(collections);
    }

    for name in only {
        if !collections.iter().any(|c| &c.name == name) {
            let known: Vec<&str> = collections.iter().map(|c| c.name.as_str()).collect();
            bail!("Unknown collection '{name}'. Known: {}", known.join(", "));
        }
    }
    Ok(collections
        .into_iter()
        .filter(|c| only.contains(&c.name))
        .collect())
}

async fn run_collections(run: &RunConfig, collections: &[Collection]) -> Result<()> {
    let fetcher = PageFetcher::with_settings(&run.user_agent, run.timeout)
        .context("Failed to build HTTP client")?;
    let driver = PaginationDriver::new(fetcher, run.driver.clone());
    let runner = BatchRunner::new(&run.output_root).with_collection_delay(run.collection_delay);

    info!(
        collections = collections.len(),
        strategy = %run.driver.strategy,
        max_pages = ?run.driver.max_pages,
        output_root = %run.output_root.display(),
        "Harvester starting"
    );

    let report = runner.run(&driver, collections, interrupt_signal).await;
    println!("{}", render_batch_summary(&report, runner.output_root()));
    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed it never resolves.
async fn interrupt_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(error = %error, "cannot listen for Ctrl-C; interrupts disabled");
        std::future::pending::<()>().await;
    }
}
