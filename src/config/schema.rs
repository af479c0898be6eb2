//! Configuration schema types for `hoi4mod.toml`
//!
//! Defines the structure and validation rules for mod build configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Build section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Folder the mod is installed into (defaults to the game's mod folder)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Build the dev variant
    #[serde(default)]
    pub dev: bool,
    /// Suffix appended to the descriptor `name` in dev builds
    #[serde(default = "default_dev_name_suffix")]
    pub dev_name_suffix: String,
    /// Suffix appended to the output folder name in dev builds
    #[serde(default = "default_dev_dir_suffix")]
    pub dev_dir_suffix: String,
    /// Keep building after a file fails and report all failures at the end
    #[serde(default)]
    pub keep_going: bool,
}

fn default_dev_name_suffix() -> String {
    " - Dev Version".to_string()
}

fn default_dev_dir_suffix() -> String {
    "_dev".to_string()
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: None,
            dev: false,
            dev_name_suffix: default_dev_name_suffix(),
            dev_dir_suffix: default_dev_dir_suffix(),
            keep_going: false,
        }
    }
}

/// Watch mode configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
    /// Clear terminal before reporting each change
    #[serde(default)]
    pub clear_screen: bool,
}

fn default_debounce_ms() -> u32 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms(), clear_screen: false }
    }
}

/// Complete hoi4mod.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModConfig {
    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,
    /// Watch mode settings
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "watch.debounce_ms")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "hoi4mod.toml: '{}' {}", self.field, self.message)
    }
}

impl ModConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.watch.debounce_ms == 0 || self.watch.debounce_ms > 60_000 {
            errors.push(ConfigValidationError {
                field: "watch.debounce_ms".to_string(),
                message: "must be between 1 and 60000".to_string(),
            });
        }

        let suffix = &self.build.dev_dir_suffix;
        if suffix.contains(['/', '\\']) || suffix == "." || suffix == ".." {
            errors.push(ConfigValidationError {
                field: "build.dev_dir_suffix".to_string(),
                message: "must not contain path separators".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}
