//! Page discovery: how many result pages does this search have?

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::http::PageFetch;
use crate::scrapers::saramin;
use tracing::{info, instrument};

/// Fetch the first result page and count its pagination links.
///
/// A search without a pagination control is one page, never zero. Any
/// failure here is a [`ScrapeError::Discovery`]: without a page count
/// nothing can be dispatched.
#[instrument(level = "info", skip_all, fields(url = %config.search_url))]
pub async fn discover_pages<F: PageFetch>(
    fetcher: &F,
    config: &ScrapeConfig,
) -> Result<u32, ScrapeError> {
    let body = fetcher
        .fetch(&config.search_url)
        .await
        .map_err(ScrapeError::discovery)?;
    let pages = saramin::count_pages(&body);
    info!(pages, "Discovered result pages");
    Ok(pages)
}
