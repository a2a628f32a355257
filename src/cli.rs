//! Command-line interface definitions for the job scraper.
//!
//! Arguments can be given as flags; the ones most likely to differ per
//! deployment also fall back to environment variables.

use crate::config::{
    DEFAULT_BASE_URL, DEFAULT_DETAIL_URL_PREFIX, DEFAULT_OUTPUT, DEFAULT_PAGE_PARAM,
    FailurePolicy,
};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the job scraper.
///
/// # Examples
///
/// ```sh
/// # Search for "python" and write jobs.csv in the current directory
/// job_scraper python
///
/// # Ten workers, slower pacing, custom output file
/// job_scraper python -w 10 --delay-ms 200 -o out/python.csv
///
/// # Keep going past pages that fail
/// job_scraper python --on-page-error skip
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search keyword
    pub term: String,

    /// Search endpoint; the keyword and page number are appended as query parameters
    #[arg(long, env = "JOB_SCRAPER_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Query parameter that carries the page number
    #[arg(long, default_value = DEFAULT_PAGE_PARAM)]
    pub page_param: String,

    /// Prefix joined with a listing id to form the ID column
    #[arg(long, default_value = DEFAULT_DETAIL_URL_PREFIX)]
    pub detail_url_prefix: String,

    /// Number of concurrent page workers
    #[arg(short, long, env = "JOB_SCRAPER_WORKERS", default_value_t = 6)]
    pub workers: usize,

    /// Delay before each page request, in milliseconds
    #[arg(long, default_value_t = 50)]
    pub delay_ms: u64,

    /// Capacity of the record channel feeding the writer
    #[arg(long, default_value_t = 200)]
    pub channel_capacity: usize,

    /// Per-request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Output CSV file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// What to do when a page fails to fetch or parse
    #[arg(long, value_enum, default_value_t = FailurePolicy::Abort)]
    pub on_page_error: FailurePolicy,
}
