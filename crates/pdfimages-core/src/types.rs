//! Core data types for the pdfimages extraction pipeline.
//!
//! [`ExtractedImage`] flows through the per-PDF pipeline; [`PdfReport`] and
//! [`BatchResult`] describe what happened once a run completes.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::pipeline::fingerprint::Fingerprint;

/// A kind of PDF object that may carry extractable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Image XObjects drawn directly by a page
    Images,
    /// Images nested inside Form XObjects
    Forms,
    /// Text objects (reserved, nothing is extracted)
    Text,
}

impl ObjectKind {
    const ALL: [ObjectKind; 3] = [Self::Images, Self::Forms, Self::Text];

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "images" | "image" => Some(Self::Images),
            "forms" | "form" => Some(Self::Forms),
            "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Closed capability set of object kinds to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectKinds {
    images: bool,
    forms: bool,
    text: bool,
}

impl ObjectKinds {
    /// Every kind enabled.
    pub fn all() -> Self {
        Self {
            images: true,
            forms: true,
            text: true,
        }
    }

    /// Build the effective set from include/exclude lists.
    ///
    /// `"all"` expands to every kind. Exclusions win over inclusions.
    /// Unknown names are returned as the error value.
    pub fn from_lists<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, String> {
        let mut kinds = Self::default();
        for name in include {
            for kind in Self::expand(name.as_ref())? {
                kinds.set(kind, true);
            }
        }
        for name in exclude {
            for kind in Self::expand(name.as_ref())? {
                kinds.set(kind, false);
            }
        }
        Ok(kinds)
    }

    fn expand(name: &str) -> Result<Vec<ObjectKind>, String> {
        if name.eq_ignore_ascii_case("all") {
            return Ok(ObjectKind::ALL.to_vec());
        }
        ObjectKind::parse(name)
            .map(|k| vec![k])
            .ok_or_else(|| name.to_string())
    }

    fn set(&mut self, kind: ObjectKind, on: bool) {
        match kind {
            ObjectKind::Images => self.images = on,
            ObjectKind::Forms => self.forms = on,
            ObjectKind::Text => self.text = on,
        }
    }

    /// Whether objects of `kind` should be extracted.
    pub fn contains(&self, kind: ObjectKind) -> bool {
        match kind {
            ObjectKind::Images => self.images,
            ObjectKind::Forms => self.forms,
            ObjectKind::Text => self.text,
        }
    }

    /// Whether any image-bearing kind is enabled.
    pub fn wants_images(&self) -> bool {
        self.images || self.forms
    }
}

/// Size bounds for the filter stage. All bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub min_size_bytes: u64,
    pub max_size_bytes: Option<u64>,
}

impl Default for FilterCriteria {
    /// Accepts everything.
    fn default() -> Self {
        Self {
            min_width: 0,
            min_height: 0,
            max_width: None,
            max_height: None,
            min_size_bytes: 0,
            max_size_bytes: None,
        }
    }
}

/// Deduplication settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DedupConfig {
    pub enabled: bool,
    /// 1.0 keeps only byte-identical pixels together, 0.0 merges everything
    pub similarity_threshold: f64,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            similarity_threshold: 0.95,
        }
    }
}

/// Where on the page an extracted image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOrigin {
    /// An image XObject drawn by the page content stream
    PageImage,
    /// An image XObject nested inside a Form XObject
    FormImage,
    /// A region cut out of a page-sized scanned image
    ScanRegion,
}

impl ImageOrigin {
    /// The object kind that governs whether this origin is extracted.
    pub fn kind(self) -> ObjectKind {
        match self {
            Self::PageImage | Self::ScanRegion => ObjectKind::Images,
            Self::FormImage => ObjectKind::Forms,
        }
    }
}

/// Original encoded bytes of an embedded image (e.g. a DCT stream is a JPEG file).
#[derive(Debug, Clone)]
pub struct EncodedSource {
    pub bytes: Vec<u8>,
    pub format: image::ImageFormat,
}

/// One image found inside a PDF.
///
/// Built once by the extractor and never mutated afterwards; the pipeline
/// drops it after it is written or rejected.
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    /// PDF the image was found in
    pub source_pdf: PathBuf,

    /// Page number (1-based)
    pub page: u32,

    /// Discovery position on the page (0-based)
    pub index: u32,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Stored size inside the PDF in bytes
    pub byte_size: u64,

    /// How the image was located
    pub origin: ImageOrigin,

    /// Decoded pixels
    pub image: DynamicImage,

    /// Original encoded bytes when the PDF stores a standalone image file
    pub encoded: Option<EncodedSource>,

    /// Perceptual + exact fingerprint of the pixels
    pub fingerprint: Fingerprint,
}

impl ExtractedImage {
    /// Sort key used for "earliest page, then earliest index" tie-breaks.
    pub fn position(&self) -> (u32, u32) {
        (self.page, self.index)
    }
}

/// Outcome of processing one PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfReport {
    /// Source PDF
    pub path: PathBuf,

    /// Images decoded from the PDF
    pub images_extracted: usize,

    /// Images rejected by the size filter
    pub images_filtered: usize,

    /// Images dropped as near-duplicates
    pub images_duplicate: usize,

    /// Images written to the output tree
    pub images_written: usize,

    /// Images found but not written, for any reason
    pub images_skipped: usize,

    /// Embedded images in an encoding that is not decoded (JPX, CCITT, JBIG2)
    pub images_unsupported: usize,

    /// Error messages collected while processing
    pub errors: Vec<String>,

    /// The whole PDF failed (unreadable, too large, missing)
    pub failed: bool,

    /// Processing stopped early on a cancellation request
    pub cancelled: bool,

    /// Paths of the written images
    pub outputs: Vec<PathBuf>,

    /// Wall-clock processing time
    pub elapsed_ms: u64,
}

impl PdfReport {
    /// Create an empty report for `path`.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            ..Default::default()
        }
    }
}

/// Aggregated results of a batch run, keyed by source PDF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub per_pdf: BTreeMap<PathBuf, PdfReport>,
}

impl BatchResult {
    /// Record a completed PDF report.
    pub fn insert(&mut self, report: PdfReport) {
        self.per_pdf.insert(report.path.clone(), report);
    }

    /// Number of PDFs processed (including failed ones).
    pub fn pdf_count(&self) -> usize {
        self.per_pdf.len()
    }

    /// PDFs that failed entirely.
    pub fn failed_pdfs(&self) -> impl Iterator<Item = &PdfReport> {
        self.per_pdf.values().filter(|r| r.failed)
    }

    /// Whether any PDF failed entirely.
    pub fn has_failures(&self) -> bool {
        self.per_pdf.values().any(|r| r.failed)
    }

    /// Whether any PDF was cut short by cancellation.
    pub fn was_cancelled(&self) -> bool {
        self.per_pdf.values().any(|r| r.cancelled)
    }

    /// Total images written across all PDFs.
    pub fn total_written(&self) -> usize {
        self.per_pdf.values().map(|r| r.images_written).sum()
    }

    /// Total images extracted across all PDFs.
    pub fn total_extracted(&self) -> usize {
        self.per_pdf.values().map(|r| r.images_extracted).sum()
    }

    /// Total images skipped across all PDFs.
    pub fn total_skipped(&self) -> usize {
        self.per_pdf.values().map(|r| r.images_skipped).sum()
    }
}
