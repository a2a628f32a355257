//! HTTP access to the job site.
//!
//! The pipeline never talks to `reqwest` directly. It goes through the
//! [`PageFetch`] trait so a run can be driven by anything that turns a URL
//! into a document body.

use crate::error::ScrapeError;
use crate::utils::truncate_for_log;
use reqwest::header::CONTENT_TYPE;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Fetch one document.
///
/// Implementations must treat any non-success status as a failure
/// ([`ScrapeError::Status`]) so callers only ever see a body for a page the
/// site actually served.
pub trait PageFetch: Send + Sync {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, ScrapeError>> + Send;
}

/// [`PageFetch`] backed by a shared `reqwest` client.
///
/// No retries: a single failed request is reported as-is.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScrapeError::Config(format!("could not build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

/// Reject responses that declare a non-HTML media type. A missing header is
/// given the benefit of the doubt.
fn check_content_type(url: &Url, content_type: Option<&str>) -> Result<(), ScrapeError> {
    match content_type {
        Some(ct) if !ct.to_ascii_lowercase().contains("html") => Err(ScrapeError::Parse {
            url: url.to_string(),
            reason: format!("expected an HTML document, got {ct}"),
        }),
        _ => Ok(()),
    }
}

impl PageFetch for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String, ScrapeError> {
        let t0 = Instant::now();
        info!(%url, "Requesting");

        let fetch_err = |source| ScrapeError::Fetch {
            url: url.to_string(),
            source,
        };
        let res = self.client.get(url.clone()).send().await.map_err(fetch_err)?;
        let status = res.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "Request failed");
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        check_content_type(url, content_type.as_deref())?;

        // Decodes with the response charset, replacing invalid sequences.
        let body = res.text().await.map_err(fetch_err)?;

        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            preview = %truncate_for_log(&body, 120),
            "Fetched page"
        );
        Ok(body)
    }
}
