//! Configuration management for pdfimages.
//!
//! Configuration is read from YAML (or TOML, chosen by the `.toml`
//! extension) with sensible defaults. Every section is optional and missing
//! keys fall back to the values in the section's `Default` impl.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use crate::pipeline::naming::NamingPattern;
use crate::types::{DedupConfig, FilterCriteria, ObjectKinds};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for pdfimages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output tree settings
    pub output: OutputConfig,

    /// Size bounds, transforms and deduplication
    pub processing: ProcessingConfig,

    /// Object-type and byte-size filters
    pub filters: FiltersConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Pipeline settings
    pub pipeline: PipelineConfig,

    /// Resource limits
    pub limits: LimitsConfig,
}

impl Config {
    /// Load configuration from the first default location that exists.
    ///
    /// Returns default configuration if none of them exist.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::candidate_paths().into_iter().find(|p| p.is_file()) {
            Some(path) => {
                tracing::debug!("Loading config from {:?}", path);
                Self::load_from(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let is_toml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("toml"));
        let config = if is_toml {
            toml::from_str(&content)?
        } else {
            Self::from_yaml(&content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML text. An empty document yields the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_value(value)?)
    }

    /// Default config file locations, in lookup order.
    ///
    /// - the platform config directory (e.g. `~/.config/pdfimages/config.yaml`)
    /// - `~/.pdfimages/config.yaml`
    /// - `./pdfimages.yaml`
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dirs) = directories::ProjectDirs::from("com", "pdfimages", "pdfimages") {
            paths.push(dirs.config_dir().join("config.yaml"));
        }
        if let Ok(home) = std::env::var("HOME") {
            paths.push(PathBuf::from(home).join(".pdfimages").join("config.yaml"));
        }
        paths.push(PathBuf::from("pdfimages.yaml"));
        paths
    }

    /// Get the resolved output directory (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        let path_str = self.output.directory.to_string_lossy();
        PathBuf::from(shellexpand::tilde(&path_str).into_owned())
    }

    /// Dimension and byte-size bounds for the filter stage.
    pub fn filter_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            min_width: self.processing.min_width,
            min_height: self.processing.min_height,
            max_width: self.processing.max_width,
            max_height: self.processing.max_height,
            min_size_bytes: self.filters.min_size_bytes,
            max_size_bytes: self.filters.max_size_bytes,
        }
    }

    /// Deduplication settings.
    pub fn dedup(&self) -> DedupConfig {
        DedupConfig {
            enabled: self.processing.deduplicate,
            similarity_threshold: self.processing.similarity_threshold,
        }
    }

    /// Effective object kinds after applying exclusions.
    pub fn object_kinds(&self) -> Result<ObjectKinds, ConfigError> {
        ObjectKinds::from_lists(&self.filters.include_types, &self.filters.exclude_types)
            .map_err(|name| {
                ConfigError::ValidationError(format!(
                    "filters: unknown object type '{}' (expected images, forms, text or all)",
                    name
                ))
            })
    }

    /// Parsed file naming pattern.
    pub fn naming(&self) -> Result<NamingPattern, ConfigError> {
        NamingPattern::parse(&self.output.naming_pattern).map_err(|e| {
            ConfigError::ValidationError(format!("output.naming_pattern: {}", e))
        })
    }

    /// Serialize the config to a YAML string.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
