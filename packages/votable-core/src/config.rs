//! Parser configuration.
//!
//! Supports JSON config files, environment variable overrides, and defaults.

use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoError};

/// How strictly VOTable conformance problems are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pedantic {
    /// Treat fixable violations as errors
    Exception,
    /// Repair violations and report a warning
    #[default]
    Warn,
    /// Repair violations silently
    Ignore,
}

impl FromStr for Pedantic {
    type Err = VoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exception" | "true" => Ok(Pedantic::Exception),
            "warn" | "false" => Ok(Pedantic::Warn),
            "ignore" => Ok(Pedantic::Ignore),
            other => Err(VoError::Config(format!("Invalid pedantic mode: {}", other))),
        }
    }
}

impl fmt::Display for Pedantic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pedantic::Exception => write!(f, "exception"),
            Pedantic::Warn => write!(f, "warn"),
            Pedantic::Ignore => write!(f, "ignore"),
        }
    }
}

/// Configuration shared by all converters of one parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Conformance handling mode (default: warn)
    pub pedantic: Pedantic,
    /// Warnings of one code logged before further ones are suppressed (default: 10)
    pub max_warnings: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            pedantic: Pedantic::Warn,
            max_warnings: 10,
        }
    }
}

impl ParserConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration that rejects every fixable violation.
    pub fn pedantic() -> Self {
        Self {
            pedantic: Pedantic::Exception,
            ..Self::default()
        }
    }

    /// Loads configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| VoError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_json(&content)
    }

    /// Parses configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| VoError::Config(format!("Invalid JSON: {}", e)))
    }

    /// Saves the configuration to a JSON file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| VoError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), json)
            .map_err(|e| VoError::Config(format!("Failed to write config file: {}", e)))?;
        Ok(())
    }

    /// Applies environment variable overrides.
    ///
    /// `VOTABLE_PEDANTIC` overrides `pedantic` and `VOTABLE_MAX_WARNINGS`
    /// overrides `max_warnings`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("VOTABLE_PEDANTIC") {
            self.pedantic = val.parse()?;
        }
        if let Ok(val) = env::var("VOTABLE_MAX_WARNINGS") {
            self.max_warnings = val
                .parse()
                .map_err(|_| VoError::Config(format!("Invalid max_warnings: {}", val)))?;
        }
        Ok(())
    }
}
