//! CSV output for extracted records.
//!
//! The output file has exactly one owner: a [`RecordWriter`] running on a
//! dedicated blocking thread (see [`spawn_writer`]). Workers never touch the
//! file; they hand records over a bounded channel and the writer appends
//! them in the order it receives them.
//!
//! # File Layout
//!
//! 1. UTF-8 byte-order mark, so spreadsheet tools pick the right encoding
//! 2. The fixed header row
//! 3. One row per record, with the `ID` column expanded to a detail-page URL

use crate::error::ScrapeError;
use crate::models::Record;
use crate::utils::ensure_parent_dir;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

pub const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
pub const HEADER: [&str; 6] = ["ID", "Title", "Location", "Company", "Condition", "ExpireDate"];

/// One output row. Column order matches [`HEADER`].
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "ID")]
    id: String,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Location")]
    location: &'a str,
    #[serde(rename = "Company")]
    company: &'a str,
    #[serde(rename = "Condition")]
    condition: &'a str,
    #[serde(rename = "ExpireDate")]
    expire_date: &'a str,
}

impl<'a> CsvRow<'a> {
    fn new(record: &'a Record, detail_url_prefix: &str) -> Self {
        Self {
            id: record.detail_url(detail_url_prefix),
            title: &record.title,
            location: &record.location,
            company: &record.company,
            condition: &record.condition,
            expire_date: &record.expire_date,
        }
    }
}

/// Appends records as CSV rows to a sink it exclusively owns.
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
    detail_url_prefix: String,
    rows: u64,
}

impl RecordWriter<File> {
    /// Create (or truncate) `path` and write the BOM and header.
    pub fn create(path: &Path, detail_url_prefix: &str) -> Result<Self, ScrapeError> {
        ensure_parent_dir(path)?;
        let file = File::create(path)?;
        info!(path = %path.display(), "Created output file");
        Self::from_writer(file, detail_url_prefix)
    }
}

impl<W: Write> RecordWriter<W> {
    /// Wrap `inner`, writing the BOM and header before anything else.
    pub fn from_writer(mut inner: W, detail_url_prefix: &str) -> Result<Self, ScrapeError> {
        inner.write_all(UTF8_BOM)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(HEADER)?;
        writer.flush()?;
        Ok(Self {
            writer,
            detail_url_prefix: detail_url_prefix.to_string(),
            rows: 0,
        })
    }

    /// Append one row and flush it to the sink.
    ///
    /// Every row that returned `Ok` is in the sink, so a run that aborts
    /// later keeps everything written up to that point.
    pub fn write(&mut self, record: &Record) -> Result<(), ScrapeError> {
        self.writer
            .serialize(CsvRow::new(record, &self.detail_url_prefix))?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, excluding the header.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Write every record received on `rx` until the channel is closed, then
    /// flush. Returns the number of rows written.
    ///
    /// Blocks the calling thread; run it via [`spawn_writer`] or on a thread
    /// outside the async runtime.
    pub fn drain(mut self, rx: &mut mpsc::Receiver<Record>) -> Result<u64, ScrapeError> {
        while let Some(record) = rx.blocking_recv() {
            debug!(id = %record.id, "Writing record");
            if let Err(e) = self.write(&record) {
                error!(rows = self.rows(), error = %e, "Write failed; closing output");
                return Err(e);
            }
        }
        let rows = self.rows();
        self.finish()?;
        Ok(rows)
    }

    /// Flush buffered rows and hand back the underlying sink.
    pub fn finish(self) -> Result<W, ScrapeError> {
        self.writer
            .into_inner()
            .map_err(|e| ScrapeError::Io(e.into_error()))
    }
}

/// Start the single writer for a run on a dedicated blocking thread.
///
/// `open` runs on that thread and produces the writer, so the output is
/// created only once dispatching starts. The task ends when every sender of
/// `rx` has been dropped (normal completion) or when opening or a write
/// fails. In the latter case `rx` is dropped with it, so producers see the
/// channel close and stop.
#[instrument(level = "info", skip_all)]
pub fn spawn_writer<W, O>(
    open: O,
    mut rx: mpsc::Receiver<Record>,
) -> JoinHandle<Result<u64, ScrapeError>>
where
    W: Write + Send + 'static,
    O: FnOnce() -> Result<RecordWriter<W>, ScrapeError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let writer = open()?;
        let rows = writer.drain(&mut rx)?;
        info!(rows, "Writer finished");
        Ok(rows)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREFIX: &str = "https://example.com/view?rec_idx=";

    fn record(id: &str) -> Record {
        Record::new(id, &format!("Title {id}"), "Seoul", "Acme, Inc.", "3 years", "~ 12/31")
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("job_scraper_csv_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_bom_and_header_come_first() {
        let writer = RecordWriter::from_writer(Vec::new(), PREFIX).unwrap();
        let bytes = writer.finish().unwrap();

        assert!(bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text, "ID,Title,Location,Company,Condition,ExpireDate\n");
    }

    #[test]
    fn test_rows_use_detail_url_and_quote_commas() {
        let mut writer = RecordWriter::from_writer(Vec::new(), PREFIX).unwrap();
        writer.write(&record("42")).unwrap();
        assert_eq!(writer.rows(), 1);

        let bytes = writer.finish().unwrap();
        let text = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "https://example.com/view?rec_idx=42,Title 42,Seoul,\"Acme, Inc.\",3 years,~ 12/31"
        );
    }

    #[test]
    fn test_drain_writes_until_channel_closes() {
        let (tx, mut rx) = mpsc::channel(2);
        let producer = std::thread::spawn(move || {
            for i in 0..5 {
                tx.blocking_send(record(&i.to_string())).unwrap();
            }
        });

        let path = temp_path("drain.csv");
        let writer = RecordWriter::create(&path, PREFIX).unwrap();
        let rows = writer.drain(&mut rx).unwrap();
        producer.join().unwrap();

        assert_eq!(rows, 5);
        let content = std::fs::read(&path).unwrap();
        assert!(content.starts_with(UTF8_BOM));
        let mut reader = csv::Reader::from_reader(&content[UTF8_BOM.len()..]);
        let header: Vec<&str> = reader.headers().unwrap().iter().collect();
        assert_eq!(header, HEADER.to_vec());
        let ids: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[0].to_string())
            .collect();
        assert_eq!(ids.len(), 5);
        assert!(ids.iter().all(|id| id.starts_with(PREFIX)));
        std::fs::remove_file(&path).unwrap();
    }

    struct FailingSink {
        budget: usize,
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if buf.len() > self.budget {
                return Err(std::io::Error::other("disk full"));
            }
            self.budget -= buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        // Room for the BOM only; the header flush or first row must fail.
        let sink = FailingSink {
            budget: UTF8_BOM.len(),
        };
        let result = RecordWriter::from_writer(sink, PREFIX).and_then(|mut w| {
            for i in 0..10_000 {
                w.write(&record(&i.to_string()))?;
            }
            w.finish().map(|_| ())
        });
        assert!(matches!(
            result,
            Err(ScrapeError::Write(_)) | Err(ScrapeError::Io(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_spawn_writer_round_trip() {
        let path = temp_path("spawned.csv");
        let (tx, rx) = mpsc::channel(4);
        let open_path = path.clone();
        let handle = spawn_writer(move || RecordWriter::create(&open_path, PREFIX), rx);

        for i in 0..3 {
            tx.send(record(&format!("s{i}"))).await.unwrap();
        }
        drop(tx);

        let rows = handle.await.unwrap().unwrap();
        assert_eq!(rows, 3);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 4);
        std::fs::remove_file(&path).unwrap();
    }
}
