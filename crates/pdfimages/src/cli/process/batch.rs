//! Progress reporting and end-of-run summaries.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use pdfimages_core::{BatchObserver, BatchResult, PdfReport};

/// Drives an indicatif progress bar from batch events.
pub struct ProgressObserver {
    bar: ProgressBar,
}

impl ProgressObserver {
    pub fn new() -> Self {
        Self {
            bar: create_progress_bar(0),
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchObserver for ProgressObserver {
    fn on_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_message("extracting...");
    }

    fn on_pdf_done(&self, report: &PdfReport) {
        self.bar.inc(1);
        self.bar.set_message(display_name(&report.path));
    }
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn status(report: &PdfReport) -> &'static str {
    if report.cancelled {
        "cancelled"
    } else if report.failed {
        "failed"
    } else if report.errors.is_empty() {
        "ok"
    } else {
        "warnings"
    }
}

/// Render the per-PDF table printed by `--verbose`.
pub fn format_table(result: &BatchResult) -> String {
    let names: Vec<String> = result.per_pdf.keys().map(|p| display_name(p)).collect();
    let width = names.iter().map(|n| n.len()).max().unwrap_or(0).max(3);

    let mut out = String::new();
    out.push_str(&format!(
        "  {:<width$}  {:>9}  {:>7}  {:>5}  {:>8}  {:>7}  {}\n",
        "PDF", "extracted", "written", "dupes", "filtered", "skipped", "status"
    ));
    out.push_str(&format!("  {}\n", "-".repeat(width + 58)));
    for (name, report) in names.iter().zip(result.per_pdf.values()) {
        out.push_str(&format!(
            "  {:<width$}  {:>9}  {:>7}  {:>5}  {:>8}  {:>7}  {}\n",
            name,
            report.images_extracted,
            report.images_written,
            report.images_duplicate,
            report.images_filtered,
            report.images_skipped,
            status(report)
        ));
        for error in &report.errors {
            out.push_str(&format!("    ! {error}\n"));
        }
    }
    out
}

pub fn print_table(result: &BatchResult) {
    eprintln!();
    eprint!("{}", format_table(result));
}

/// Print the run totals.
pub fn print_summary(result: &BatchResult, elapsed: Duration) {
    let pdfs = result.pdf_count();
    let failed = result.failed_pdfs().count();
    let secs = elapsed.as_secs_f64();
    let rate = if secs > 0.0 {
        result.total_extracted() as f64 / secs
    } else {
        0.0
    };

    tracing::info!(
        pdfs,
        failed,
        written = result.total_written(),
        "Extraction finished"
    );

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    PDFs:         {:>8}", pdfs);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    eprintln!("    Extracted:    {:>8}", result.total_extracted());
    eprintln!("    Written:      {:>8}", result.total_written());
    eprintln!("    Skipped:      {:>8}", result.total_skipped());
    if result.was_cancelled() {
        eprintln!("    Cancelled:         yes");
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Duration:     {:>7.1}s", secs);
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report(path: &str, written: usize) -> PdfReport {
        let mut r = PdfReport::new(Path::new(path));
        r.images_extracted = written + 1;
        r.images_written = written;
        r.images_duplicate = 1;
        r.images_skipped = 1;
        r
    }

    #[test]
    fn test_table_lists_every_pdf() {
        let mut result = BatchResult::default();
        result.insert(report("/docs/alpha.pdf", 3));
        let mut bad = report("/docs/broken.pdf", 0);
        bad.failed = true;
        bad.errors.push("Unreadable PDF".into());
        result.insert(bad);

        let table = format_table(&result);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].contains("extracted"));
        assert!(lines[2].contains("alpha.pdf") && lines[2].ends_with("ok"));
        assert!(lines[3].contains("broken.pdf") && lines[3].ends_with("failed"));
        assert!(lines[4].contains("! Unreadable PDF"));
    }

    #[test]
    fn test_status_labels() {
        let mut r = report("a.pdf", 1);
        assert_eq!(status(&r), "ok");
        r.errors.push("x".into());
        assert_eq!(status(&r), "warnings");
        r.cancelled = true;
        assert_eq!(status(&r), "cancelled");
    }

    #[test]
    fn test_display_name_uses_file_name() {
        assert_eq!(display_name(&PathBuf::from("/a/b/c.pdf")), "c.pdf");
    }

    #[test]
    fn test_observer_counts_pdfs() {
        let observer = ProgressObserver::new();
        observer.on_start(2);
        observer.on_pdf_done(&report("a.pdf", 1));
        assert_eq!(observer.bar.position(), 1);
        assert_eq!(observer.bar.length(), Some(2));
        observer.finish();
    }
}
