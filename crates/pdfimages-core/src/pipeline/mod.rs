//! PDF image extraction pipeline components.
//!
//! This module contains all the stages of the extraction pipeline:
//! - **validate**: Cheap pre-checks on a PDF file
//! - **extract**: Decode embedded images page by page
//! - **segment**: Split page-sized scans into picture regions
//! - **filter**: Dimension and byte-size bounds
//! - **fingerprint**: Content and perceptual hashes
//! - **dedup**: Near-duplicate grouping within a PDF
//! - **transform**: Scaling and re-encoding
//! - **naming**: File name templates
//! - **output**: Output tree layout and file writes
//! - **discovery**: Find PDFs in directories
//! - **batch**: Orchestrates the full pipeline over many PDFs
//! - **channel**: Bounded channel for per-PDF reports

pub mod batch;
pub mod channel;
pub mod dedup;
pub mod discovery;
pub mod extract;
pub mod filter;
pub mod fingerprint;
pub mod naming;
pub mod output;
pub mod segment;
pub mod transform;
pub mod validate;

// Re-exports for convenient access
pub use batch::{BatchObserver, BatchPhase, BatchRunner, CancelFlag, NoopObserver, PdfPipeline};
pub use dedup::{Admission, DedupIndex, DedupOutcome, Deduplicator};
pub use discovery::DiscoveredFile;
pub use extract::{ExtractOptions, ImageExtractor, PdfImages};
pub use fingerprint::{Fingerprint, Fingerprinter};
pub use naming::NamingPattern;
pub use output::{OutputWriter, PathRegistry};
pub use segment::{Rect, SegmentOptions};
pub use transform::Transformer;
pub use validate::Validator;
