//! Configuration for document loading and validation
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (json-loader.toml)
//! - Environment variables (JSON_LOADER__*)
//!
//! ## Example config file (json-loader.toml):
//! ```toml
//! [limits]
//! max_input_bytes = 1048576
//!
//! [validation]
//! draft = "draft7"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::schema::ValidationOptions;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Input limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Schema validation settings
    #[serde(default)]
    pub validation: ValidationOptions,
}

/// Input limits
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Reject documents larger than this many bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_input_bytes: Option<u64>,
}

impl LoaderConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, adding a specific file that must exist
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "json-loader.toml",
            ".json-loader.toml",
            "config/json-loader.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "json-loader", "json-loader") {
            let xdg_config = config_dir.config_dir().join("json-loader.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // JSON_LOADER__LIMITS__MAX_INPUT_BYTES=...
        builder = builder.add_source(
            Environment::with_prefix("JSON_LOADER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}
