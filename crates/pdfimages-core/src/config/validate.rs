//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    ///
    /// Called by the loaders; callers that build or override a config in
    /// code run it again before use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.processing;

        if p.quality > 100 {
            return Err(invalid("processing.quality must be between 0 and 100"));
        }
        if !(p.scaling > 0.0 && p.scaling <= 10.0) {
            return Err(invalid("processing.scaling must be in (0, 10]"));
        }
        if !(0.0..=1.0).contains(&p.similarity_threshold) {
            return Err(invalid(
                "processing.similarity_threshold must be between 0.0 and 1.0",
            ));
        }
        if p.dpi == 0 {
            return Err(invalid("processing.dpi must be > 0"));
        }
        if p.parallel_workers == 0 {
            return Err(invalid("processing.parallel_workers must be > 0"));
        }
        if p.max_width.is_some_and(|max| max < p.min_width) {
            return Err(invalid(
                "processing.max_width must be >= processing.min_width",
            ));
        }
        if p.max_height.is_some_and(|max| max < p.min_height) {
            return Err(invalid(
                "processing.max_height must be >= processing.min_height",
            ));
        }
        if self
            .filters
            .max_size_bytes
            .is_some_and(|max| max < self.filters.min_size_bytes)
        {
            return Err(invalid(
                "filters.max_size_bytes must be >= filters.min_size_bytes",
            ));
        }
        self.object_kinds()?;
        self.naming()?;

        if self.logging.tracing_level().is_none() {
            return Err(invalid(format!(
                "logging.level must be one of DEBUG, INFO, WARNING, ERROR, CRITICAL (got '{}')",
                self.logging.level
            )));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(invalid("logging.format must be 'pretty' or 'json'"));
        }
        if self.pipeline.buffer_size == 0 {
            return Err(invalid("pipeline.buffer_size must be > 0"));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(invalid("limits.max_file_size_mb must be > 0"));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(invalid("limits.max_image_dimension must be > 0"));
        }
        Ok(())
    }
}
