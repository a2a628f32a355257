//! Page workers.
//!
//! Each worker repeatedly takes the next [`PageIndex`] off the shared work
//! queue, fetches and extracts that page, and pushes the records into the
//! bounded channel feeding the writer. A worker stops when:
//!
//! - the queue is closed and empty (normal completion)
//! - the shared stop flag is raised (another worker failed)
//! - the writer is gone (its receiver was dropped), which is an error
//! - its own page fails under [`FailurePolicy::Abort`]

use crate::config::{FailurePolicy, ScrapeConfig};
use crate::error::ScrapeError;
use crate::http::PageFetch;
use crate::models::{PageIndex, Record};
use crate::scrapers::saramin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

/// Receiving end of the work queue, shared by all workers.
pub type WorkQueue = Arc<Mutex<mpsc::UnboundedReceiver<PageIndex>>>;

/// Everything one worker needs. Cheap to clone: all shared state is behind `Arc`.
pub struct WorkerContext<F> {
    pub fetcher: Arc<F>,
    pub config: Arc<ScrapeConfig>,
    pub queue: WorkQueue,
    pub records: mpsc::Sender<Record>,
    pub stop: Arc<AtomicBool>,
}

impl<F> Clone for WorkerContext<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: Arc::clone(&self.fetcher),
            config: Arc::clone(&self.config),
            queue: Arc::clone(&self.queue),
            records: self.records.clone(),
            stop: Arc::clone(&self.stop),
        }
    }
}

/// What a worker did before it exited cleanly.
#[derive(Debug, Default)]
pub struct WorkerReport {
    pub pages: u32,
    pub records: u64,
    /// Pages that failed and were skipped.
    pub failed_pages: Vec<PageIndex>,
}

/// Fetch one page and extract its records, in card order.
pub async fn fetch_page<F: PageFetch>(
    fetcher: &F,
    config: &ScrapeConfig,
    page: PageIndex,
) -> Result<Vec<Record>, ScrapeError> {
    let url = config.page_url(page);
    let body = fetcher.fetch(&url).await?;
    Ok(saramin::extract_page(&body))
}

fn writer_closed<F>(ctx: &WorkerContext<F>, page: PageIndex) -> ScrapeError {
    ctx.stop.store(true, Ordering::Release);
    warn!(%page, "Writer has stopped; worker exiting");
    ScrapeError::WriterClosed
}

/// Fail fast when the writer is gone, before spending a request on `page`.
fn ensure_writer_open<F>(ctx: &WorkerContext<F>, page: PageIndex) -> Result<(), ScrapeError> {
    if ctx.records.is_closed() {
        return Err(writer_closed(ctx, page));
    }
    Ok(())
}

async fn next_page(queue: &WorkQueue) -> Option<PageIndex> {
    queue.lock().await.recv().await
}

/// Run one worker until the queue is drained or the run is stopped.
#[instrument(level = "info", skip(ctx))]
pub async fn run_worker<F: PageFetch>(
    worker: usize,
    ctx: WorkerContext<F>,
) -> Result<WorkerReport, ScrapeError> {
    let mut report = WorkerReport::default();

    while !ctx.stop.load(Ordering::Acquire) {
        let Some(page) = next_page(&ctx.queue).await else {
            break;
        };
        // A failure may have been raised while we waited for the queue.
        if ctx.stop.load(Ordering::Acquire) {
            break;
        }
        ensure_writer_open(&ctx, page)?;

        if !ctx.config.request_delay.is_zero() {
            sleep(ctx.config.request_delay).await;
        }
        ensure_writer_open(&ctx, page)?;

        let records = match fetch_page(ctx.fetcher.as_ref(), &ctx.config, page).await {
            Ok(records) => records,
            Err(e) => match ctx.config.on_page_error {
                FailurePolicy::Abort => {
                    ctx.stop.store(true, Ordering::Release);
                    error!(%page, error = %e, "Page failed; stopping run");
                    return Err(e.on_page(page));
                }
                FailurePolicy::Skip => {
                    warn!(%page, error = %e, "Page failed; skipping");
                    report.failed_pages.push(page);
                    continue;
                }
            },
        };

        let count = records.len();
        for record in records {
            if ctx.records.send(record).await.is_err() {
                return Err(writer_closed(&ctx, page));
            }
        }
        report.pages += 1;
        report.records += count as u64;
        debug!(%page, count, "Page done");
    }

    info!(pages = report.pages, records = report.records, "Worker finished");
    Ok(report)
}
