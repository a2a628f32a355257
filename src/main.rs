//! # Job Scraper
//!
//! Scrapes every result page of a job-site search and writes the listings
//! to a single CSV file.
//!
//! ## Usage
//!
//! ```sh
//! job_scraper python -o jobs.csv
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery**: fetch the first result page and count its pages
//! 2. **Fetching**: a pool of workers (6 by default) fetches pages in parallel,
//!    pausing briefly before each request
//! 3. **Extraction**: each page's job cards become normalized records
//! 4. **Output**: a single writer drains the records into the CSV file
//!
//! The first failed page aborts the run unless `--on-page-error skip` is given.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod http;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use config::ScrapeConfig;
use http::HttpFetcher;
use pipeline::Orchestrator;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = match ScrapeConfig::from_cli(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    info!(
        term = %args.term,
        url = %config.search_url,
        workers = config.workers,
        output = %config.output.display(),
        "job_scraper starting up"
    );

    let fetcher = HttpFetcher::new(config.request_timeout)?;
    let orchestrator = Orchestrator::new(config, fetcher);

    match orchestrator.run().await {
        Ok(summary) => {
            info!(
                pages = summary.pages,
                records = summary.records,
                skipped_pages = ?summary.failed_pages,
                secs = summary.elapsed.as_secs(),
                millis = summary.elapsed.subsec_millis(),
                output = %orchestrator.config().output.display(),
                "Done"
            );
            Ok(())
        }
        Err(e) => {
            error!(
                error = %e,
                output = %orchestrator.config().output.display(),
                "Scrape failed"
            );
            Err(e.into())
        }
    }
}
