//! Configuration management for the extractor.
//!
//! Command-line flags select what to extract; everything about *where* and
//! *how* (bucket, gsutil binary, scratch space, JPEG quality, logging) is
//! loaded here from configuration files and environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration for the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractConfig {
    /// Object storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Record decoding configuration
    #[serde(default)]
    pub decoding: DecodingConfig,

    /// Output image configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Bucket holding the dataset, one prefix per split
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Path or name of the gsutil executable
    #[serde(default = "default_gsutil_path")]
    pub gsutil_path: String,

    /// Directory for downloaded shards (system temp dir when unset)
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
}

/// Record decoding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DecodingConfig {
    /// Verify the CRC32C of every record header and body
    #[serde(default = "default_verify_checksums")]
    pub verify_checksums: bool,
}

/// Output image configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// JPEG quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_bucket() -> String {
    "gs://waymo_open_dataset_v_1_2_0_individual_files".to_string()
}
fn default_gsutil_path() -> String {
    "gsutil".to_string()
}
fn default_verify_checksums() -> bool {
    true
}
fn default_jpeg_quality() -> u8 {
    75
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            gsutil_path: default_gsutil_path(),
            temp_dir: None,
        }
    }
}

impl Default for DecodingConfig {
    fn default() -> Self {
        Self {
            verify_checksums: default_verify_checksums(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ExtractConfig {
    /// Load configuration from file and environment variables.
    ///
    /// Sources, later overriding earlier:
    /// 1. `config/extract.{toml,yaml,json}`
    /// 2. `/etc/waymo-extract/extract.{toml,yaml,json}`
    /// 3. Environment variables (e.g., `EXTRACT__STORAGE__BUCKET`)
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/extract").required(false))
            .add_source(File::with_name("/etc/waymo-extract/extract").required(false))
            .add_source(
                Environment::with_prefix("EXTRACT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.storage.bucket.trim().is_empty() {
            return Err(ConfigValidationError::MissingField(
                "storage.bucket".to_string(),
            ));
        }

        if self.storage.gsutil_path.trim().is_empty() {
            return Err(ConfigValidationError::MissingField(
                "storage.gsutil_path".to_string(),
            ));
        }

        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigValidationError::InvalidValue {
                field: "output.jpeg_quality".to_string(),
                message: "Quality must be between 1 and 100".to_string(),
            });
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(ConfigValidationError::InvalidValue {
                field: "logging.format".to_string(),
                message: format!("Unknown format '{}', expected json or pretty", self.logging.format),
            });
        }

        Ok(())
    }
}

impl StorageConfig {
    /// Bucket without a trailing slash.
    pub fn bucket_root(&self) -> &str {
        self.bucket.trim_end_matches('/')
    }

    /// Directory where shards are downloaded.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
