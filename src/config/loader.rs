//! Configuration loading for `hoi4mod.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::ModConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the optional config file at the mod root.
pub const CONFIG_FILE_NAME: &str = "hoi4mod.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse hoi4mod.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override output folder
    pub output: Option<PathBuf>,
    /// Force the dev variant on
    pub dev: Option<bool>,
    /// Keep building after per-file failures
    pub keep_going: Option<bool>,
}

/// Find hoi4mod.toml in the mod root.
pub fn find_config(mod_root: &Path) -> Option<PathBuf> {
    let config_path = mod_root.join(CONFIG_FILE_NAME);
    if config_path.is_file() {
        Some(config_path)
    } else {
        None
    }
}

/// Load configuration for a mod.
///
/// If a path is provided, loads from that file. Otherwise looks for
/// `hoi4mod.toml` in the mod root, falling back to defaults.
///
/// # Example
/// ```ignore
/// let config = load_config(None, Path::new("my-mod"))?;
/// ```
pub fn load_config(path: Option<&Path>, mod_root: &Path) -> Result<ModConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(mod_root),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(ModConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<ModConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: ModConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut ModConfig, overrides: &CliOverrides) {
    if let Some(ref output) = overrides.output {
        config.build.output = Some(output.clone());
    }

    if let Some(dev) = overrides.dev {
        config.build.dev = dev;
    }

    if let Some(keep_going) = overrides.keep_going {
        config.build.keep_going = keep_going;
    }
}

/// The game's mod folder, used when no output folder is configured.
///
/// `%USERPROFILE%\Documents\Paradox Interactive\Hearts of Iron IV\mod` on
/// Windows, `$HOME/.local/share/Paradox Interactive/Hearts of Iron IV/mod`
/// elsewhere.
pub fn default_output_root() -> PathBuf {
    documents_dir().join("Paradox Interactive").join("Hearts of Iron IV").join("mod")
}

fn documents_dir() -> PathBuf {
    if cfg!(windows) {
        env::var("USERPROFILE")
            .map(|home| PathBuf::from(home).join("Documents"))
            .unwrap_or_else(|_| PathBuf::from("Documents"))
    } else {
        env::var("HOME")
            .map(|home| PathBuf::from(home).join(".local").join("share"))
            .unwrap_or_else(|_| PathBuf::from(".local/share"))
    }
}

/// Resolve the output root: configured value or the game's mod folder.
pub fn resolve_output_root(config: &ModConfig) -> PathBuf {
    config.build.output.clone().unwrap_or_else(default_output_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_mod_root() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[watch]\ndebounce_ms = 50\n").unwrap();

        assert_eq!(find_config(temp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        assert_eq!(find_config(temp.path()), None);
    }

    #[test]
    fn test_load_config_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = load_config(None, temp.path()).unwrap();
        assert_eq!(config, ModConfig::default());
    }

    #[test]
    fn test_load_config_from_mod_root() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "[build]\ndev = true\n").unwrap();

        let config = load_config(None, temp.path()).unwrap();
        assert!(config.build.dev);
    }

    #[test]
    fn test_load_config_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("other.toml");
        fs::write(&path, "[build]\nkeep_going = true\n").unwrap();

        let config = load_config(Some(&path), temp.path()).unwrap();
        assert!(config.build.keep_going);
    }

    #[test]
    fn test_load_config_parse_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "[build\n").unwrap();

        let result = load_config(None, temp.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE_NAME), "[watch]\ndebounce_ms = 0\n").unwrap();

        let err = load_config(None, temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("watch.debounce_ms"));
    }

    #[test]
    fn test_merge_cli_overrides() {
        let mut config = ModConfig::default();
        let overrides = CliOverrides {
            output: Some(PathBuf::from("/tmp/mods")),
            dev: Some(true),
            ..Default::default()
        };
        merge_cli_overrides(&mut config, &overrides);

        assert_eq!(config.build.output, Some(PathBuf::from("/tmp/mods")));
        assert!(config.build.dev);
        assert!(!config.build.keep_going);
    }

    #[test]
    fn test_resolve_output_root_prefers_config() {
        let mut config = ModConfig::default();
        config.build.output = Some(PathBuf::from("/custom"));
        assert_eq!(resolve_output_root(&config), PathBuf::from("/custom"));
    }

    #[test]
    #[serial]
    #[cfg(not(windows))]
    fn test_default_output_root_uses_home() {
        let original = env::var("HOME").ok();
        env::set_var("HOME", "/home/tester");

        let root = default_output_root();

        match original {
            Some(home) => env::set_var("HOME", home),
            None => env::remove_var("HOME"),
        }

        assert_eq!(
            root,
            PathBuf::from("/home/tester/.local/share/Paradox Interactive/Hearts of Iron IV/mod")
        );
    }
}
