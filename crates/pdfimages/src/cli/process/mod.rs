//! Extraction run: argument handling, setup, batch execution and reporting.

mod batch;
mod setup;
pub mod types;

pub use types::SizeBound;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use pdfimages_core::{BatchRunner, OutputFormat};

use batch::{print_summary, print_table, ProgressObserver};
pub use setup::{apply_overrides, load_config};

/// Exit status when every PDF was processed.
pub const EXIT_OK: u8 = 0;
/// Exit status when at least one PDF failed or the run was cancelled.
pub const EXIT_PARTIAL: u8 = 1;
/// Exit status for command-line usage errors.
pub const EXIT_USAGE: u8 = 2;
/// Exit status for configuration errors.
pub const EXIT_CONFIG: u8 = 3;
/// Exit status for any other fatal error.
pub const EXIT_FATAL: u8 = 4;

/// Arguments for an extraction run.
#[derive(Args, Debug, Default)]
pub struct ProcessArgs {
    /// PDF file or directory of PDFs
    #[arg(required_unless_present = "print_config")]
    pub input: Option<PathBuf>,

    /// Output directory (defaults to output.directory from the config)
    pub output: Option<PathBuf>,

    /// Configuration file (YAML, or TOML with a .toml extension)
    #[arg(short, long, env = "PDFIMAGES_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Minimum image size: bytes (500KB) or pixels (800x600)
    #[arg(short = 'm', long, value_name = "SIZE")]
    pub min_size: Option<SizeBound>,

    /// Maximum image size: bytes (5MB) or pixels (4000x4000)
    #[arg(short = 'M', long, value_name = "SIZE")]
    pub max_size: Option<SizeBound>,

    /// Encoder quality for JPEG output (0-100)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(0..=100))]
    pub quality: Option<u32>,

    /// Scale factor applied to every written image
    #[arg(short, long)]
    pub scale: Option<f64>,

    /// Print a per-PDF summary table when done
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Number of PDFs processed in parallel
    #[arg(short = 'j', long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Output image format: png, jpg, jpeg, tiff or bmp
    #[arg(short, long, value_parser = types::parse_format)]
    pub format: Option<OutputFormat>,

    /// Keep near-duplicate images
    #[arg(long)]
    pub no_dedup: bool,

    /// Write a JSON (or .jsonl) report of the run to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Output logs in JSON format
    #[arg(long)]
    pub json_logs: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    pub print_config: bool,
}

/// Run the extraction described by `args` with the given runner.
///
/// Returns the process exit status. Errors bubble up for the caller to map.
pub async fn execute(args: &ProcessArgs, runner: BatchRunner) -> anyhow::Result<ExitCode> {
    let Some(input) = args.input.as_deref() else {
        return Ok(ExitCode::from(EXIT_USAGE));
    };

    if !input.exists() {
        eprintln!(
            "Error: input path does not exist: {:?}\n\n  Hint: Check the file path and try again.",
            input
        );
        return Ok(ExitCode::from(EXIT_USAGE));
    }

    let cancel = runner.cancel_flag();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; finishing PDFs already in progress");
            cancel.cancel();
        }
    });

    let start = std::time::Instant::now();
    let observer = Arc::new(ProgressObserver::new());
    let result = runner.run_with_observer(input, observer.clone()).await;
    observer.finish();
    interrupt.abort();

    if let Some(path) = &args.report {
        pdfimages_core::write_report_file(path, &result)
            .map_err(|e| anyhow::anyhow!("Failed to write report {:?}: {e}", path))?;
        tracing::info!("Report written to {:?}", path);
    }

    if args.verbose {
        print_table(&result);
    }
    print_summary(&result, start.elapsed());

    if result.was_cancelled() || result.has_failures() {
        Ok(ExitCode::from(EXIT_PARTIAL))
    } else {
        Ok(ExitCode::from(EXIT_OK))
    }
}
