//! pdfimages core - extraction of distinct raster images from PDF documents.
//!
//! # Architecture
//!
//! Each PDF runs through a pure, per-document pipeline:
//!
//! ```text
//! PDF → Validate → Extract (→ Segment) → Filter → Dedup → Transform → Write
//! ```
//!
//! [`BatchRunner`] walks an input directory and runs that pipeline for
//! several PDFs at once, collecting a [`BatchResult`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use pdfimages_core::{BatchRunner, Config};
//!
//! #[tokio::main]
//! async fn main() -> pdfimages_core::Result<()> {
//!     let config = Config::load()?;
//!     let runner = BatchRunner::new(&config)?;
//!     let result = runner.run("./papers".as_ref()).await;
//!     println!("Wrote {} images", result.total_written());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod types;

// Re-exports for convenient access
pub use config::{Config, OutputFormat};
pub use error::{ConfigError, PdfImagesError, PipelineError, PipelineResult, Result};
pub use pipeline::{BatchObserver, BatchPhase, BatchRunner, CancelFlag};
pub use report::{write_report_file, ReportFormat, ReportWriter};
pub use types::{
    BatchResult, DedupConfig, ExtractedImage, FilterCriteria, ImageOrigin, ObjectKind,
    ObjectKinds, PdfReport,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
