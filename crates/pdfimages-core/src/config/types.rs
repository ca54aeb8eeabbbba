//! Sub-configuration structs with defaults matching the sample config file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Image format written to the output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpg,
    Jpeg,
    Tiff,
    Bmp,
}

impl OutputFormat {
    /// Parse a format name (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" => Some(Self::Jpg),
            "jpeg" => Some(Self::Jpeg),
            "tiff" | "tif" => Some(Self::Tiff),
            "bmp" => Some(Self::Bmp),
            _ => None,
        }
    }

    /// File extension used for written images.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpg => "jpg",
            Self::Jpeg => "jpeg",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
        }
    }

    /// Lossy formats honour `processing.quality`; the rest ignore it.
    pub fn is_lossy(self) -> bool {
        matches!(self, Self::Jpg | Self::Jpeg)
    }

    /// The matching `image` crate format.
    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpg | Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Tiff => image::ImageFormat::Tiff,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Base directory for extracted images (supports `~`)
    pub directory: PathBuf,

    /// Mirror each PDF's relative path under `directory`
    pub maintain_structure: bool,

    /// Image format for written files
    pub format: OutputFormat,

    /// File name template; `{page}`, `{index}` and `{name}` are substituted
    pub naming_pattern: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("extracted_images"),
            maintain_structure: true,
            format: OutputFormat::Png,
            naming_pattern: "page_{page:03d}_{index:03d}".to_string(),
        }
    }
}

/// Processing settings: size bounds, transforms and deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Minimum image width in pixels
    pub min_width: u32,

    /// Minimum image height in pixels
    pub min_height: u32,

    /// Maximum image width in pixels
    pub max_width: Option<u32>,

    /// Maximum image height in pixels
    pub max_height: Option<u32>,

    /// Encoder quality for lossy formats (0-100)
    pub quality: u32,

    /// Scale factor applied before writing, in (0, 10]
    pub scaling: f64,

    /// Resolution hint used for page-scan region detection
    pub dpi: u32,

    /// Drop near-duplicate images within a PDF
    pub deduplicate: bool,

    /// Similarity at or above which two images are duplicates (0.0-1.0)
    pub similarity_threshold: f64,

    /// Number of PDFs processed concurrently
    pub parallel_workers: usize,

    /// Split page-sized scans into their separate picture regions
    pub split_regions: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            min_width: 100,
            min_height: 100,
            max_width: None,
            max_height: None,
            quality: 90,
            scaling: 1.0,
            dpi: 300,
            deduplicate: true,
            similarity_threshold: 0.95,
            parallel_workers: 4,
            split_regions: true,
        }
    }
}

/// Object-type and byte-size filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FiltersConfig {
    /// Object kinds to extract: "images", "forms", "text" or "all"
    pub include_types: Vec<String>,

    /// Object kinds removed from `include_types`
    pub exclude_types: Vec<String>,

    /// Minimum stored image size in bytes
    pub min_size_bytes: u64,

    /// Maximum stored image size in bytes
    pub max_size_bytes: Option<u64>,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            include_types: vec!["images".to_string(), "forms".to_string(), "all".to_string()],
            exclude_types: vec![],
            min_size_bytes: 1024,
            max_size_bytes: None,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: DEBUG, INFO, WARNING, ERROR, CRITICAL
    pub level: String,

    /// Optional log file (plain text, appended)
    pub file: Option<PathBuf>,

    /// Log to stderr
    pub console: bool,

    /// Console log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "INFO".to_string(),
            file: None,
            console: true,
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Map the configured level onto a `tracing` filter directive.
    ///
    /// Accepts DEBUG, INFO, WARNING (or WARN), ERROR and CRITICAL in any
    /// case and returns `None` for anything else.
    pub fn tracing_level(&self) -> Option<&'static str> {
        match self.level.to_uppercase().as_str() {
            "DEBUG" => Some("debug"),
            "INFO" => Some("info"),
            "WARNING" | "WARN" => Some("warn"),
            "ERROR" | "CRITICAL" => Some("error"),
            _ => None,
        }
    }
}

/// Pipeline settings for backpressure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Max per-PDF reports buffered before workers wait on the aggregator
    pub buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { buffer_size: 64 }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum PDF file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum embedded image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 512,
            max_image_dimension: 20000,
        }
    }
}
