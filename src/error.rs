//! Error taxonomy for a scrape run.
//!
//! Every failure that can stop a run is a [`ScrapeError`] value returned up
//! the call chain to the orchestrator, which decides whether the run aborts
//! or the failed page is skipped. A selector that matches nothing is not an
//! error at all: the field simply comes back empty.

use crate::models::PageIndex;
use thiserror::Error;

/// Anything that can go wrong while discovering, fetching, extracting or
/// writing job listings.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The first page could not be fetched or parsed, so the page count is
    /// unknown and nothing can be dispatched.
    #[error("page discovery failed: {source}")]
    Discovery {
        #[source]
        source: Box<ScrapeError>,
    },

    /// Transport-level failure talking to the site.
    #[error("request to {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The site answered, but not with a success status.
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// The response is not an HTML document.
    #[error("could not parse document from {url}: {reason}")]
    Parse { url: String, reason: String },

    /// A page failed inside a worker; wraps the underlying cause with the
    /// page it belongs to.
    #[error("page {page} failed: {source}")]
    Page {
        page: PageIndex,
        #[source]
        source: Box<ScrapeError>,
    },

    /// The destination file rejected a write.
    #[error("failed writing output: {0}")]
    Write(#[from] csv::Error),

    /// Filesystem error around the output file (create, flush).
    #[error("output I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The writer stopped taking records before the run finished. The
    /// writer's own error is what the orchestrator reports.
    #[error("output writer stopped before the run finished")]
    WriterClosed,

    /// Invalid run configuration, caught before any network activity.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A worker or the writer task panicked or was lost.
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ScrapeError {
    /// Wrap a first-page failure as a discovery failure.
    pub fn discovery(source: ScrapeError) -> Self {
        ScrapeError::Discovery {
            source: Box::new(source),
        }
    }

    /// Attach the page index a failure happened on.
    pub fn on_page(self, page: PageIndex) -> Self {
        ScrapeError::Page {
            page,
            source: Box::new(self),
        }
    }
}
