//! Configuration file loading for the analyzer.
//!
//! Settings come from `analyzer.toml` in the current directory, or from the
//! file passed with `--config`. Every section and field is optional.

use std::path::{Path, PathBuf};

use game_analysis::{EngineConfig, ThresholdPolicy, DEFAULT_DEPTH};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Search depth settings.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct AnalysisSettings {
    /// Depth used when none is requested. Defaults to 2.
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Requested depths above this are clamped. Defaults to 30.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
}

fn default_depth() -> u32 {
    DEFAULT_DEPTH
}

fn default_max_depth() -> u32 {
    30
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            max_depth: default_max_depth(),
        }
    }
}

impl AnalysisSettings {
    /// Depth to search at for a requested depth.
    ///
    /// Missing or zero falls back to the configured default; anything above
    /// `max_depth` is clamped.
    pub fn resolve_depth(&self, requested: Option<u32>) -> u32 {
        let fallback = if self.depth == 0 { DEFAULT_DEPTH } else { self.depth };
        let depth = match requested {
            Some(0) | None => fallback,
            Some(d) => d,
        };
        depth.min(self.max_depth.max(1))
    }
}

/// Contents of `analyzer.toml`.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub classification: ThresholdPolicy,
}

impl AnalyzerConfig {
    /// Loads the configuration.
    ///
    /// With `path`, that file must exist. Without it, `analyzer.toml` in the
    /// current directory is read if present, otherwise defaults are used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Self::config_path();
                if default_path.exists() {
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Returns the default configuration file path.
    pub fn config_path() -> PathBuf {
        PathBuf::from("analyzer.toml")
    }
}
