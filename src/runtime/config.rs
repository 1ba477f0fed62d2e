//! Runtime configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional TOML file
//! 3. environment variables prefixed `REGULA_`, e.g. `REGULA_MAX_ROWS=100`
//!    or `REGULA_PATHS=base.json,extra.json`

use crate::error::{Error, Result};
use crate::format::OutputFormat;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
pub const ENV_PREFIX: &str = "REGULA";

/// Configuration for a [`Runtime`](super::Runtime)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Base documents loaded at startup
    pub paths: Vec<PathBuf>,
    /// Query result format
    pub output_format: OutputFormat,
    /// Maximum rows produced per query (unbounded if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
}

impl RuntimeConfig {
    /// Load configuration from defaults, `file` and the environment.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(file) = file {
            builder = builder.add_source(File::from(file).format(FileFormat::Toml));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("paths"),
        );

        let config = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::SerializationError(e.to_string()))
    }
}
