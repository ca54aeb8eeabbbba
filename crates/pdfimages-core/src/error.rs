//! Error types for the pdfimages extraction pipeline.
//!
//! Errors are organized by scope so callers can decide what a failure means:
//! a [`ConfigError`] aborts the run before any PDF is touched, an
//! [`PipelineError::UnreadablePdf`] fails a single PDF, and a
//! [`PipelineError::WriteError`] fails a single image.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for pdfimages operations.
#[derive(Error, Debug)]
pub enum PdfImagesError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse YAML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Configuration values are invalid or contradict each other
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline processing errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The PDF is corrupt, encrypted without credentials, or not a PDF at all
    #[error("Unreadable PDF {path}: {message}")]
    UnreadablePdf { path: PathBuf, message: String },

    /// An embedded image could not be decoded
    #[error("Decode error for {path} (page {page}): {message}")]
    Decode {
        path: PathBuf,
        page: u32,
        message: String,
    },

    /// An embedded image uses an encoding we do not decode
    #[error("Unsupported image in {path} (page {page}): {encoding}")]
    UnsupportedImage {
        path: PathBuf,
        page: u32,
        encoding: String,
    },

    /// Image dimensions exceed limit
    #[error("Image too large in {path} (page {page}): {width}x{height} > {max_dim}")]
    ImageTooLarge {
        path: PathBuf,
        page: u32,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Writing an output image failed
    #[error("Write error for {path}: {message}")]
    WriteError { path: PathBuf, message: String },

    /// Processing was stopped by a cancellation request
    #[error("Cancelled while processing {0}")]
    Cancelled(PathBuf),
}

impl PipelineError {
    /// Whether this error fails the whole PDF rather than a single image.
    pub fn is_fatal_for_pdf(&self) -> bool {
        matches!(
            self,
            Self::UnreadablePdf { .. }
                | Self::FileTooLarge { .. }
                | Self::FileNotFound(_)
                | Self::Cancelled(_)
        )
    }
}

/// Convenience type alias for pdfimages results.
pub type Result<T> = std::result::Result<T, PdfImagesError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_pdf_is_fatal_for_pdf() {
        let err = PipelineError::UnreadablePdf {
            path: PathBuf::from("broken.pdf"),
            message: "invalid file header".into(),
        };
        assert!(err.is_fatal_for_pdf());
        assert!(err.to_string().contains("broken.pdf"));
    }

    #[test]
    fn test_write_error_is_per_image() {
        let err = PipelineError::WriteError {
            path: PathBuf::from("out/page_001_000.png"),
            message: "permission denied".into(),
        };
        assert!(!err.is_fatal_for_pdf());
    }
}
