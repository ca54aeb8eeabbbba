//! Configuration loading and command-line overrides.

use pdfimages_core::{Config, ConfigError};

use super::types::SizeBound;
use super::ProcessArgs;

/// Load the configuration named by `--config`, or the first default location.
pub fn load_config(args: &ProcessArgs) -> Result<Config, ConfigError> {
    match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Apply command-line flags on top of `config`, then validate the result.
pub fn apply_overrides(config: &mut Config, args: &ProcessArgs) -> Result<(), ConfigError> {
    if let Some(output) = &args.output {
        config.output.directory = output.clone();
    }

    match args.min_size {
        Some(SizeBound::Bytes(n)) => config.filters.min_size_bytes = n,
        Some(SizeBound::Dimensions { width, height }) => {
            config.processing.min_width = width;
            config.processing.min_height = height;
        }
        None => {}
    }
    match args.max_size {
        Some(SizeBound::Bytes(n)) => config.filters.max_size_bytes = Some(n),
        Some(SizeBound::Dimensions { width, height }) => {
            config.processing.max_width = Some(width);
            config.processing.max_height = Some(height);
        }
        None => {}
    }

    if let Some(quality) = args.quality {
        config.processing.quality = quality;
    }
    if let Some(scale) = args.scale {
        config.processing.scaling = scale;
    }
    if let Some(jobs) = args.jobs {
        config.processing.parallel_workers = jobs;
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if args.no_dedup {
        config.processing.deduplicate = false;
    }
    if args.debug {
        config.logging.level = "DEBUG".to_string();
    }
    if args.json_logs {
        config.logging.format = "json".to_string();
    }

    config.validate()
}
