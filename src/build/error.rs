//! Build and per-file transform errors.

use crate::output::OutputError;
use crate::raster::RasterError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure transforming a single source file.
///
/// Nothing is written for a file whose source could not be decoded.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Reading the source failed
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Source bytes are not a decodable image
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: RasterError,
    },
    /// Descriptor is not valid UTF-8 text
    #[error("{} is not valid UTF-8", path.display())]
    InvalidText { path: PathBuf },
    /// Writing an artifact failed (including a destination without a folder)
    #[error(transparent)]
    Output(#[from] OutputError),
    /// Another source file in this build already produces the same output
    #[error("output '{dest}' is already produced by '{other}'")]
    Conflict { dest: String, other: String },
}

impl TransformError {
    /// Whether this is the "destination is not in a folder" precondition failure.
    pub fn is_path_structure(&self) -> bool {
        matches!(self, TransformError::Output(OutputError::NoParent(_)))
    }
}

/// Error during a full build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Mod source folder does not exist
    #[error("Mod folder not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    /// Refusing to clear a folder that is not a dedicated mod output folder
    #[error("Refusing to delete {}: not a safe mod output folder", .0.display())]
    UnsafeOutputDir(PathBuf),
    /// Filesystem failure outside a single file transform
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Walking the mod folder failed
    #[error("Failed to list mod files: {0}")]
    Discovery(String),
    /// A file transform failed (fail-fast mode)
    #[error("{relative}: {source}")]
    Transform {
        relative: String,
        #[source]
        source: TransformError,
    },
}

impl BuildError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io { path: path.into(), source }
    }
}
