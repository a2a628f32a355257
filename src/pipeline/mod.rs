//! The concurrent extraction pipeline.
//!
//! ```text
//! discover_pages ──► work queue (1..=N) ──► W page workers ──► bounded channel ──► writer ──► CSV
//! ```
//!
//! The [`Orchestrator`] moves through four phases:
//!
//! 1. **Discovering**: fetch the first page and count its pages. A failure
//!    here ends the run before any worker or writer is started.
//! 2. **Dispatching**: start the writer, start `W` workers, enqueue every
//!    page index and close the queue.
//! 3. **Draining**: wait for every worker to exit. Only then is the last
//!    sender of the record channel gone, which is what tells the writer no
//!    more records are coming.
//! 4. **Closed**: wait for the writer to flush and exit.
//!
//! Under [`FailurePolicy::Abort`] the first failed page raises a shared stop
//! flag and the remaining workers are aborted; the writer still flushes what
//! it already received before the error is returned. A failed writer always
//! aborts the run, whatever the policy: workers see the record channel close
//! and stop before fetching anything else.

pub mod discovery;
pub mod worker;

use crate::config::{FailurePolicy, ScrapeConfig};
use crate::error::ScrapeError;
use crate::http::PageFetch;
use crate::models::{PageIndex, RunSummary};
use crate::outputs::csv_writer::{RecordWriter, spawn_writer};
use discovery::discover_pages;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};
use worker::{WorkerContext, run_worker};

/// Drives one complete scrape run.
pub struct Orchestrator<F> {
    config: Arc<ScrapeConfig>,
    fetcher: Arc<F>,
}

impl<F: PageFetch + 'static> Orchestrator<F> {
    pub fn new(config: ScrapeConfig, fetcher: F) -> Self {
        Self {
            config: Arc::new(config),
            fetcher: Arc::new(fetcher),
        }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    /// Run discovery, the worker pool and the writer to completion, writing
    /// to the configured output file.
    pub async fn run(&self) -> Result<RunSummary, ScrapeError> {
        let path = self.config.output.clone();
        let prefix = self.config.detail_url_prefix.clone();
        self.run_with_writer(move || RecordWriter::create(&path, &prefix))
            .await
    }

    /// Like [`run`](Self::run), with the writer produced by `open` on the
    /// writer thread once dispatching starts.
    #[instrument(level = "info", skip_all, fields(workers = self.config.workers))]
    pub async fn run_with_writer<W, O>(&self, open: O) -> Result<RunSummary, ScrapeError>
    where
        W: Write + Send + 'static,
        O: FnOnce() -> Result<RecordWriter<W>, ScrapeError> + Send + 'static,
    {
        let t0 = Instant::now();
        self.config.validate()?;

        // Discovering
        let pages = discover_pages(self.fetcher.as_ref(), &self.config).await?;

        // Dispatching
        let (record_tx, record_rx) = mpsc::channel(self.config.channel_capacity);
        let writer = spawn_writer(open, record_rx);

        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let ctx = WorkerContext {
            fetcher: Arc::clone(&self.fetcher),
            config: Arc::clone(&self.config),
            queue: Arc::new(Mutex::new(queue_rx)),
            records: record_tx,
            stop: Arc::new(AtomicBool::new(false)),
        };
        let stop = Arc::clone(&ctx.stop);

        let mut workers = JoinSet::new();
        for id in 0..self.config.workers {
            workers.spawn(run_worker(id, ctx.clone()));
        }
        // Workers now hold the only record senders.
        drop(ctx);

        for page in PageIndex::range(pages) {
            if queue_tx.send(page).is_err() {
                break;
            }
        }
        drop(queue_tx);
        info!(pages, workers = self.config.workers, "Dispatched pages");

        // Draining
        let mut failure: Option<ScrapeError> = None;
        let mut failed_pages = Vec::new();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(report)) => failed_pages.extend(report.failed_pages),
                Ok(Err(e)) => {
                    if failure.is_none() {
                        stop.store(true, Ordering::Release);
                        workers.abort_all();
                        failure = Some(e);
                    }
                }
                Err(e) if e.is_cancelled() => {}
                Err(e) => {
                    error!(error = %e, "Worker task failed");
                    if failure.is_none() {
                        stop.store(true, Ordering::Release);
                        workers.abort_all();
                        failure = Some(ScrapeError::Task(e));
                    }
                }
            }
        }

        // Closed
        // Workers only see a closed channel; the writer holds the real cause.
        let records = match (failure, writer.await?) {
            (None | Some(ScrapeError::WriterClosed), Err(we)) => {
                error!(error = %we, "Writer failed; run aborted");
                return Err(we);
            }
            (Some(e), Ok(rows)) => {
                warn!(rows, "Run aborted; rows already written are kept");
                return Err(e);
            }
            (Some(e), Err(we)) => {
                error!(error = %we, "Writer also failed during abort");
                return Err(e);
            }
            (None, Ok(rows)) => rows,
        };

        failed_pages.sort();
        if self.config.on_page_error == FailurePolicy::Skip && !failed_pages.is_empty() {
            warn!(failed = failed_pages.len(), "Some pages were skipped");
        }

        let summary = RunSummary {
            pages,
            records,
            failed_pages,
            elapsed: t0.elapsed(),
        };
        info!(
            pages = summary.pages,
            records = summary.records,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Run complete"
        );
        Ok(summary)
    }
}
