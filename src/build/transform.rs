//! Per-file transform: decide what a source path becomes, then produce it.
//!
//! Dispatch order for one relative path:
//! 1. `ignored_files.mod`, `hoi4mod.toml` and ignore-listed paths are skipped
//! 2. image extensions: flags fan out to three DDS files, thumbnails become
//!    PNG, everything else becomes one DDS
//! 3. `descriptor.mod` is rewritten
//! 4. anything else is copied byte-for-byte

use crate::build::flags::{flag_artifacts, flag_destination, is_flag_path, FlagSize};
use crate::build::{BuildContext, TransformError};
use crate::config::CONFIG_FILE_NAME;
use crate::dds::{encode_dds, DDS_EXTENSION};
use crate::descriptor::{rewrite_descriptor, DESCRIPTOR_FILE_NAME};
use crate::ignore::{IgnoreRules, IGNORE_FILE_NAME};
use crate::output::{copy_artifact, extension, file_stem, swap_extension, write_artifact};
use crate::raster::{decode_image, encode_png, is_image_extension};
use std::fs;
use std::path::PathBuf;

/// Base name that is kept as a PNG instead of becoming a DDS.
pub const THUMBNAIL_NAME: &str = "thumbnail";

/// One file to be written, relative to the output folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub relative: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(relative: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { relative: relative.into(), bytes }
    }
}

/// Why a path produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The ignore manifest itself
    IgnoreManifest,
    /// The build config file
    ConfigFile,
    /// Matched an ignore rule
    Ignored,
}

/// What a source path turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileAction {
    /// No output
    Skip(SkipReason),
    /// Three resized DDS flags
    Flag,
    /// One DDS texture
    Texture,
    /// One PNG (thumbnail)
    Thumbnail,
    /// Rewritten descriptor
    Descriptor,
    /// Plain copy
    Copy,
}

impl std::fmt::Display for FileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileAction::Skip(_) => write!(f, "skip"),
            FileAction::Flag => write!(f, "flag"),
            FileAction::Texture => write!(f, "texture"),
            FileAction::Thumbnail => write!(f, "thumbnail"),
            FileAction::Descriptor => write!(f, "descriptor"),
            FileAction::Copy => write!(f, "copy"),
        }
    }
}

/// Classify a `/`-separated path relative to the mod root.
pub fn classify(relative: &str, rules: &IgnoreRules) -> FileAction {
    if relative == IGNORE_FILE_NAME {
        return FileAction::Skip(SkipReason::IgnoreManifest);
    }
    if relative == CONFIG_FILE_NAME {
        return FileAction::Skip(SkipReason::ConfigFile);
    }
    if rules.is_ignored(relative) {
        return FileAction::Skip(SkipReason::Ignored);
    }

    if extension(relative).is_some_and(is_image_extension) {
        if is_flag_path(relative) {
            return FileAction::Flag;
        }
        if file_stem(relative) == THUMBNAIL_NAME {
            return FileAction::Thumbnail;
        }
        return FileAction::Texture;
    }

    if relative == DESCRIPTOR_FILE_NAME {
        return FileAction::Descriptor;
    }

    FileAction::Copy
}

/// Result of transforming one source file.
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    /// Source path relative to the mod root
    pub relative: String,
    /// Branch taken
    pub action: FileAction,
    /// Files written
    pub outputs: Vec<PathBuf>,
}

impl TransformOutcome {
    pub fn is_skipped(&self) -> bool {
        matches!(self.action, FileAction::Skip(_))
    }
}

/// Transform one source file into the output folder.
pub fn transform_file(
    ctx: &BuildContext,
    rules: &IgnoreRules,
    relative: &str,
) -> Result<TransformOutcome, TransformError> {
    let action = classify(relative, rules);
    let source = ctx.mod_root().join(relative);

    let outputs = match action {
        FileAction::Skip(reason) => {
            tracing::debug!("Skipping '{}' ({:?})", relative, reason);
            Vec::new()
        }
        FileAction::Copy => {
            let dest = ctx.destination(relative);
            log_copy(&source, &dest);
            copy_artifact(&source, &dest)?;
            vec![dest]
        }
        _ => {
            let artifacts = render_artifacts(ctx, action, relative)?;
            let mut outputs = Vec::with_capacity(artifacts.len());
            for artifact in artifacts {
                let dest = ctx.destination(&artifact.relative);
                log_copy(&source, &dest);
                write_artifact(&dest, &artifact.bytes)?;
                outputs.push(dest);
            }
            outputs
        }
    };

    Ok(TransformOutcome { relative: relative.to_string(), action, outputs })
}

/// Output-relative paths a source will be written to, without reading it.
pub fn planned_outputs(action: FileAction, relative: &str) -> Vec<String> {
    match action {
        FileAction::Skip(_) => Vec::new(),
        FileAction::Flag => {
            FlagSize::ALL.iter().map(|&size| flag_destination(relative, size)).collect()
        }
        FileAction::Texture => vec![swap_extension(relative, DDS_EXTENSION)],
        FileAction::Thumbnail => vec![swap_extension(relative, "png")],
        FileAction::Descriptor | FileAction::Copy => vec![relative.to_string()],
    }
}

/// Produce the in-memory artifacts for the image and descriptor branches.
///
/// Everything is decoded and encoded before anything is written, so a bad
/// source leaves no partial output.
pub fn render_artifacts(
    ctx: &BuildContext,
    action: FileAction,
    relative: &str,
) -> Result<Vec<Artifact>, TransformError> {
    let source = ctx.mod_root().join(relative);
    let bytes =
        fs::read(&source).map_err(|e| TransformError::Read { path: source.clone(), source: e })?;

    match action {
        FileAction::Flag | FileAction::Texture | FileAction::Thumbnail => {
            let ext = extension(relative).unwrap_or_default();
            let image = decode_image(&bytes, ext)
                .map_err(|e| TransformError::Decode { path: source.clone(), source: e })?;

            Ok(match action {
                FileAction::Flag => flag_artifacts(&image, relative),
                FileAction::Thumbnail => {
                    let png = encode_png(&image)
                        .map_err(|e| TransformError::Decode { path: source.clone(), source: e })?;
                    vec![Artifact::new(swap_extension(relative, "png"), png)]
                }
                _ => vec![Artifact::new(swap_extension(relative, DDS_EXTENSION), encode_dds(&image))],
            })
        }
        FileAction::Descriptor => {
            let text = String::from_utf8(bytes)
                .map_err(|_| TransformError::InvalidText { path: source.clone() })?;
            let rewritten =
                rewrite_descriptor(&text, &ctx.descriptor_output_path(), ctx.name_suffix());
            Ok(vec![Artifact::new(relative, rewritten.into_bytes())])
        }
        FileAction::Copy => Ok(vec![Artifact::new(relative, bytes)]),
        FileAction::Skip(_) => Ok(Vec::new()),
    }
}

fn log_copy(source: &std::path::Path, dest: &std::path::Path) {
    tracing::debug!("Copying '{}'\n     to '{}'", source.display(), dest.display());
}
