//! pdfimages - extract every distinct image from PDF files.
//!
//! Takes a single PDF or a directory tree of PDFs and writes the embedded
//! images, filtered and deduplicated, into an output directory.
//!
//! # Usage
//!
//! ```bash
//! # Extract from one file into ./extracted_images
//! pdfimages report.pdf
//!
//! # Extract a whole tree as JPEG, skipping anything under 200x200
//! pdfimages ./papers ./images -f jpg -m 200x200 -v
//!
//! # Show the effective configuration
//! pdfimages --print-config
//! ```
//!
//! Exit status: 0 success, 1 some PDFs failed or the run was interrupted,
//! 2 usage error, 3 configuration error, 4 other fatal error.

use std::process::ExitCode;

use clap::Parser;
use pdfimages_core::{BatchRunner, ConfigError};

mod cli;
mod logging;

use cli::process::{self, ProcessArgs, EXIT_CONFIG, EXIT_FATAL};

/// Extract all distinct images from PDF files.
#[derive(Parser, Debug)]
#[command(name = "pdfimages")]
#[command(author, version, about, long_about = None)]
#[command(override_usage = "pdfimages [OPTIONS] <INPUT> [OUTPUT]")]
struct Cli {
    #[command(flatten)]
    args: ProcessArgs,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli.args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if e.downcast_ref::<ConfigError>().is_some() {
                ExitCode::from(EXIT_CONFIG)
            } else {
                ExitCode::from(EXIT_FATAL)
            }
        }
    }
}

async fn run(args: ProcessArgs) -> anyhow::Result<ExitCode> {
    // Logging isn't initialized until the config is known, so config
    // problems are reported through the returned error.
    let mut config = process::load_config(&args)?;
    process::apply_overrides(&mut config, &args)?;

    if args.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    logging::init(&config.logging)?;
    tracing::debug!("pdfimages v{}", pdfimages_core::VERSION);

    let runner = BatchRunner::new(&config)?;
    process::execute(&args, runner).await
}
