//! Batch report serialization in JSON or JSON Lines.
//!
//! JSON writes the whole [`BatchResult`] as one document; JSON Lines writes
//! one [`PdfReport`] per line so large batches can be streamed and grepped.

use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;

use crate::types::BatchResult;

/// Report format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Single JSON document
    Json,
    /// One JSON object per line (newline-delimited JSON)
    JsonLines,
}

impl ReportFormat {
    /// Parse format from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "jsonl" | "jsonlines" | "ndjson" => Some(Self::JsonLines),
            _ => None,
        }
    }

    /// Pick the format from a file extension; anything but `.jsonl`/`.ndjson` is JSON.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::parse)
            .unwrap_or(Self::Json)
    }
}

/// Serializes batch reports.
pub struct ReportWriter<W: Write> {
    writer: W,
    format: ReportFormat,
    pretty: bool,
    items_written: usize,
}

impl<W: Write> ReportWriter<W> {
    /// Create a new report writer.
    ///
    /// `pretty` only affects the JSON format.
    pub fn new(writer: W, format: ReportFormat, pretty: bool) -> Self {
        Self {
            writer,
            format,
            pretty,
            items_written: 0,
        }
    }

    fn write_item<T: Serialize>(&mut self, item: &T, pretty: bool) -> io::Result<()> {
        if pretty {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)?;
        self.items_written += 1;
        Ok(())
    }

    /// Write a batch result.
    pub fn write_batch(&mut self, result: &BatchResult) -> io::Result<()> {
        match self.format {
            ReportFormat::Json => {
                let summary = BatchSummary::from(result);
                self.write_item(&summary, self.pretty)?;
            }
            ReportFormat::JsonLines => {
                for report in result.per_pdf.values() {
                    self.write_item(report, false)?;
                }
            }
        }
        self.writer.flush()
    }

    /// Number of JSON documents (or lines) written.
    pub fn items_written(&self) -> usize {
        self.items_written
    }

    /// Consume the writer and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// JSON shape of a full report: totals plus the per-PDF entries.
#[derive(Serialize)]
struct BatchSummary<'a> {
    version: &'static str,
    pdfs: usize,
    failed: usize,
    images_extracted: usize,
    images_written: usize,
    images_skipped: usize,
    cancelled: bool,
    #[serde(flatten)]
    result: &'a BatchResult,
}

impl<'a> From<&'a BatchResult> for BatchSummary<'a> {
    fn from(result: &'a BatchResult) -> Self {
        Self {
            version: crate::VERSION,
            pdfs: result.pdf_count(),
            failed: result.failed_pdfs().count(),
            images_extracted: result.total_extracted(),
            images_written: result.total_written(),
            images_skipped: result.total_skipped(),
            cancelled: result.was_cancelled(),
            result,
        }
    }
}

/// Write `result` to `path`, choosing the format by extension.
pub fn write_report_file(path: &Path, result: &BatchResult) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut writer = ReportWriter::new(
        io::BufWriter::new(file),
        ReportFormat::from_path(path),
        true,
    );
    writer.write_batch(result)
}
