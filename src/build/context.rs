//! Build context containing paths and options for a build.

use crate::config::{resolve_output_root, ModConfig};
use crate::descriptor::descriptor_path;
use std::path::{Path, PathBuf};

/// Build context containing configuration and paths for a build operation.
///
/// The context is fixed for the whole build run; watch mode reuses it for
/// every incremental update.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Mod source folder
    mod_root: PathBuf,
    /// Folder the mod folder and its outer descriptor are written into
    output_root: PathBuf,
    /// Whether this is a dev build
    dev: bool,
    /// Suffix for the descriptor name in dev builds
    dev_name_suffix: String,
    /// Suffix for the output folder in dev builds
    dev_dir_suffix: String,
    /// Whether to continue after per-file failures
    keep_going: bool,
}

impl BuildContext {
    /// Create a new build context with default options.
    pub fn new(mod_root: impl Into<PathBuf>, output_root: impl Into<PathBuf>) -> Self {
        Self::from_config(mod_root, output_root, &ModConfig::default())
    }

    /// Create a context from a loaded configuration.
    ///
    /// Uses the configured output root, or the game's mod folder.
    pub fn from_mod_config(mod_root: impl Into<PathBuf>, config: &ModConfig) -> Self {
        Self::from_config(mod_root, resolve_output_root(config), config)
    }

    fn from_config(
        mod_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        config: &ModConfig,
    ) -> Self {
        Self {
            mod_root: mod_root.into(),
            output_root: output_root.into(),
            dev: config.build.dev,
            dev_name_suffix: config.build.dev_name_suffix.clone(),
            dev_dir_suffix: config.build.dev_dir_suffix.clone(),
            keep_going: config.build.keep_going,
        }
    }

    /// Set dev mode.
    pub fn with_dev(mut self, dev: bool) -> Self {
        self.dev = dev;
        self
    }

    /// Set keep-going mode.
    pub fn with_keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    pub fn mod_root(&self) -> &Path {
        &self.mod_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn is_dev(&self) -> bool {
        self.dev
    }

    pub fn keep_going(&self) -> bool {
        self.keep_going
    }

    /// Name of the mod: the last component of the mod root.
    pub fn mod_name(&self) -> String {
        self.mod_root
            .components()
            .next_back()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Folder name under the output root, suffixed in dev builds.
    pub fn output_name(&self) -> String {
        if self.dev {
            format!("{}{}", self.mod_name(), self.dev_dir_suffix)
        } else {
            self.mod_name()
        }
    }

    /// The folder the mod tree is mirrored into.
    pub fn output_dir(&self) -> PathBuf {
        self.output_root.join(self.output_name())
    }

    /// The launcher descriptor written next to the output folder.
    pub fn outer_descriptor_path(&self) -> PathBuf {
        self.output_root.join(format!("{}.mod", self.output_name()))
    }

    /// Output folder as written into `path=` descriptor lines.
    pub fn descriptor_output_path(&self) -> String {
        descriptor_path(&self.output_dir())
    }

    /// Suffix for the descriptor `name`, only in dev builds.
    pub fn name_suffix(&self) -> Option<&str> {
        if self.dev {
            Some(&self.dev_name_suffix)
        } else {
            None
        }
    }

    /// Absolute destination of an output-relative path.
    pub fn destination(&self, relative: &str) -> PathBuf {
        self.output_dir().join(relative)
    }
}
