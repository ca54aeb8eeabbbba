//! Input validation before a PDF is parsed.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Number of leading bytes searched for the `%PDF-` marker.
const HEADER_WINDOW: usize = 1024;

/// Validates PDF files before processing.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Perform quick validation before the document is loaded.
    ///
    /// Checks:
    /// - File exists and is readable
    /// - File size is within limits
    /// - A `%PDF-` header appears within the first kilobyte
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        if !path.exists() {
            return Err(PipelineError::FileNotFound(path.to_path_buf()));
        }

        let metadata = std::fs::metadata(path).map_err(|e| PipelineError::UnreadablePdf {
            path: path.to_path_buf(),
            message: format!("Cannot read metadata: {}", e),
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        self.check_header(path)
    }

    fn check_header(&self, path: &Path) -> Result<(), PipelineError> {
        let unreadable = |message: String| PipelineError::UnreadablePdf {
            path: path.to_path_buf(),
            message,
        };

        let file = std::fs::File::open(path)
            .map_err(|e| unreadable(format!("Cannot open file: {}", e)))?;

        let mut header = Vec::with_capacity(HEADER_WINDOW);
        file.take(HEADER_WINDOW as u64)
            .read_to_end(&mut header)
            .map_err(|e| unreadable(format!("Cannot read file: {}", e)))?;

        if !Self::has_pdf_header(&header) {
            return Err(unreadable("Missing %PDF- header".to_string()));
        }
        Ok(())
    }

    /// Leading bytes before the marker are tolerated.
    fn has_pdf_header(bytes: &[u8]) -> bool {
        bytes.windows(5).any(|w| w == b"%PDF-")
    }
}
