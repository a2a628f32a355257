//! Immutable run configuration.
//!
//! A [`ScrapeConfig`] is built once from the command line and handed to the
//! orchestrator. Workers and the writer only ever see shared references to it.

use crate::cli::Cli;
use crate::error::ScrapeError;
use crate::models::PageIndex;
use clap::ValueEnum;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://www.saramin.co.kr/zf_user/search/recruit";
pub const DEFAULT_PAGE_PARAM: &str = "recruitPage";
pub const DEFAULT_DETAIL_URL_PREFIX: &str =
    "https://www.saramin.co.kr/zf_user/jobs/relay/view?&rec_idx=";
pub const DEFAULT_WORKERS: usize = 6;
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(50);
pub const DEFAULT_CHANNEL_CAPACITY: usize = 200;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_OUTPUT: &str = "jobs.csv";

/// What the orchestrator does when a single page fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FailurePolicy {
    /// Stop the whole run on the first failed page.
    #[default]
    Abort,
    /// Log the failed page and keep going with the rest.
    Skip,
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Search URL for the first page, query already encoded.
    pub search_url: Url,
    /// Query parameter carrying the 1-based page number.
    pub page_param: String,
    /// Prefix joined with a record id to form its detail-page URL.
    pub detail_url_prefix: String,
    /// Number of concurrent page workers.
    pub workers: usize,
    /// Pause before every page fetch.
    pub request_delay: Duration,
    /// Capacity of the bounded record channel between workers and writer.
    pub channel_capacity: usize,
    pub request_timeout: Duration,
    pub output: PathBuf,
    pub on_page_error: FailurePolicy,
}

impl ScrapeConfig {
    /// Config for searching `term` on `base_url`, everything else defaulted.
    pub fn new(base_url: &str, term: &str) -> Result<Self, ScrapeError> {
        let mut search_url = Url::parse(base_url)
            .map_err(|e| ScrapeError::Config(format!("invalid base URL {base_url:?}: {e}")))?;
        if search_url.cannot_be_a_base() {
            return Err(ScrapeError::Config(format!(
                "base URL {base_url:?} is not a hierarchical http(s) URL"
            )));
        }
        search_url.query_pairs_mut().append_pair("searchword", term);

        Ok(Self {
            search_url,
            page_param: DEFAULT_PAGE_PARAM.to_string(),
            detail_url_prefix: DEFAULT_DETAIL_URL_PREFIX.to_string(),
            workers: DEFAULT_WORKERS,
            request_delay: DEFAULT_REQUEST_DELAY,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            output: PathBuf::from(DEFAULT_OUTPUT),
            on_page_error: FailurePolicy::Abort,
        })
    }

    /// Build and validate the config from parsed CLI arguments.
    pub fn from_cli(cli: &Cli) -> Result<Self, ScrapeError> {
        let mut config = Self::new(&cli.base_url, &cli.term)?;
        config.page_param = cli.page_param.clone();
        config.detail_url_prefix = cli.detail_url_prefix.clone();
        config.workers = cli.workers;
        config.request_delay = Duration::from_millis(cli.delay_ms);
        config.channel_capacity = cli.channel_capacity;
        config.request_timeout = Duration::from_secs(cli.timeout_secs);
        config.output = cli.output.clone();
        config.on_page_error = cli.on_page_error;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ScrapeError> {
        if self.workers == 0 {
            return Err(ScrapeError::Config("worker count must be at least 1".into()));
        }
        if self.channel_capacity == 0 {
            return Err(ScrapeError::Config(
                "channel capacity must be at least 1".into(),
            ));
        }
        if self.page_param.is_empty() {
            return Err(ScrapeError::Config("page parameter name is empty".into()));
        }
        Ok(())
    }

    /// URL of a given result page: the search URL plus `&<page_param>=<n>`.
    pub fn page_url(&self, page: PageIndex) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair(&self.page_param, &page.get().to_string());
        url
    }
}
