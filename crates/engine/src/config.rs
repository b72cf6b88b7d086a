//! Item-state configuration via `itemstate.toml`
//!
//! The persistent-state manager loads one `StateConfig` and hands it to a
//! [`StateFactory`](crate::StateFactory). Missing keys fall back to defaults.

use itemstate_core::{StateError, StateResult, DEFAULT_BASE_VERSION};
use itemstate_durability::DEFAULT_BINARY_BUFFER_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "itemstate.toml";

/// Item-state configuration loaded from `itemstate.toml`.
///
/// # Example
///
/// ```toml
/// # Base version assigned to freshly constructed states
/// initial_base_version = "v0.0"
///
/// # Initial buffer size (bytes) for base64 text of binary values
/// binary_buffer_capacity = 32768
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateConfig {
    /// Base version assigned to freshly constructed states
    #[serde(default = "default_base_version")]
    pub initial_base_version: String,
    /// Initial buffer capacity for encoding binary values
    #[serde(default = "default_binary_buffer_capacity")]
    pub binary_buffer_capacity: usize,
}

fn default_base_version() -> String {
    DEFAULT_BASE_VERSION.to_string()
}

fn default_binary_buffer_capacity() -> usize {
    DEFAULT_BINARY_BUFFER_CAPACITY
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            initial_base_version: default_base_version(),
            binary_buffer_capacity: default_binary_buffer_capacity(),
        }
    }
}

impl StateConfig {
    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns an error if the base version is empty or the buffer capacity
    /// is zero.
    pub fn validate(&self) -> StateResult<()> {
        if self.initial_base_version.trim().is_empty() {
            return Err(StateError::Config(
                "initial_base_version must not be empty".to_string(),
            ));
        }
        if self.binary_buffer_capacity == 0 {
            return Err(StateError::Config(
                "binary_buffer_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Item-state configuration
#
# Base version assigned to freshly constructed (non-overlay) states.
initial_base_version = "v0.0"

# Initial buffer size in bytes for the base64 text of binary values.
# Binary payloads are usually large; raise this for bulk binary workloads.
binary_buffer_capacity = 32768
"#
    }

    /// Parse and validate config text.
    pub fn from_toml_str(content: &str) -> StateResult<Self> {
        let config: StateConfig = toml::from_str(content)
            .map_err(|e| StateError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> StateResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StateError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content).map_err(|e| {
            StateError::Config(format!("Invalid config file '{}': {}", path.display(), e))
        })
    }

    /// Write the default config file if it does not already exist.
    ///
    /// Returns `Ok(())` whether the file was created or already existed.
    pub fn write_default_if_missing(path: &Path) -> StateResult<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                StateError::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> StateResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| StateError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            StateError::Config(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
