//! Build pipeline orchestration.
//!
//! A full build clears the output folder, writes the launcher descriptor and
//! then transforms every file in the mod folder. Watch mode keeps the same
//! pipeline around and re-runs the single-file transform for changed paths.

use crate::build::transform::{
    classify, planned_outputs, transform_file, FileAction, TransformOutcome,
};
use crate::build::{BuildContext, BuildError, BuildResult, FileResult, TransformError};
use crate::descriptor::{rewrite_descriptor, DESCRIPTOR_FILE_NAME};
use crate::ignore::IgnoreRules;
use crate::output::{relative_path, write_artifact};
use glob::{glob, Pattern};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Why a change notification produced no transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredChange {
    /// Path is not inside the mod folder
    OutsideModRoot,
    /// Path is a folder, or no longer exists
    NotAFile,
}

/// Outcome of handling one change notification.
#[derive(Debug)]
pub enum ChangeOutcome {
    /// The file was transformed again
    Updated(TransformOutcome),
    /// Nothing to do for this path
    Ignored(IgnoredChange),
    /// The transform failed; the error has been logged
    Failed { relative: String, error: TransformError },
}

impl ChangeOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, ChangeOutcome::Failed { .. })
    }
}

/// Build pipeline for one build run.
pub struct BuildPipeline {
    /// Build context
    context: BuildContext,
    /// Ignore rules, loaded once per full build
    rules: IgnoreRules,
}

impl BuildPipeline {
    /// Create a new build pipeline.
    pub fn new(context: BuildContext) -> Self {
        Self { context, rules: IgnoreRules::default() }
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    pub fn rules(&self) -> &IgnoreRules {
        &self.rules
    }

    /// Run a full build.
    ///
    /// In fail-fast mode (the default) the first file error aborts the build.
    /// With keep-going, failures are recorded in the result instead.
    pub fn build(&mut self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();
        let ctx = &self.context;
        let mod_root = ctx.mod_root().to_path_buf();
        let output_dir = ctx.output_dir();

        if !mod_root.is_dir() {
            return Err(BuildError::SourceNotFound(mod_root));
        }

        tracing::info!("Mod Name: {}", ctx.mod_name());
        tracing::info!("Mod Path: {}", mod_root.display());
        tracing::info!("Output Path: {}", output_dir.display());

        self.rules = IgnoreRules::load(&mod_root)
            .map_err(|e| BuildError::io(mod_root.join(crate::ignore::IGNORE_FILE_NAME), e))?;

        clear_output_dir(&self.context)?;
        fs::create_dir_all(&output_dir).map_err(|e| BuildError::io(&output_dir, e))?;

        let outer_descriptor =
            write_outer_descriptor(&self.context).map_err(|source| BuildError::Transform {
                relative: DESCRIPTOR_FILE_NAME.to_string(),
                source,
            })?;

        let mut result = BuildResult::new();
        result.output_dir = output_dir;
        result.outer_descriptor = outer_descriptor;

        let mut claimed: HashMap<String, String> = HashMap::new();
        for relative in discover_files(&mod_root)? {
            let file_start = Instant::now();
            let attempt = claim_outputs(&mut claimed, &self.rules, &relative)
                .and_then(|()| self.transform_path(&relative));
            match attempt {
                Ok(outcome) => {
                    result.add_result(FileResult::from_outcome(outcome, file_start.elapsed()))
                }
                Err(error) if self.context.keep_going() => {
                    tracing::error!("Failed to build {}: {}", relative, error);
                    result.add_result(FileResult::failed(
                        relative,
                        error.to_string(),
                        file_start.elapsed(),
                    ));
                }
                Err(source) => return Err(BuildError::Transform { relative, source }),
            }
        }

        result.total_duration = start.elapsed();
        Ok(result)
    }

    /// Transform one path relative to the mod root with this run's rules.
    pub fn transform_path(&self, relative: &str) -> Result<TransformOutcome, TransformError> {
        transform_file(&self.context, &self.rules, relative)
    }

    /// Handle a change notification for an absolute path.
    ///
    /// Only that file is transformed again. Errors are logged and returned
    /// as [`ChangeOutcome::Failed`], never propagated.
    pub fn handle_change(&self, path: &Path) -> ChangeOutcome {
        let Some(relative) = self.relative_to_mod_root(path) else {
            return ChangeOutcome::Ignored(IgnoredChange::OutsideModRoot);
        };
        if !path.is_file() {
            return ChangeOutcome::Ignored(IgnoredChange::NotAFile);
        }

        tracing::info!("File changed: {}", path.display());

        let result = self.transform_path(&relative).and_then(|outcome| {
            if outcome.action == FileAction::Descriptor {
                write_outer_descriptor(&self.context)?;
            }
            Ok(outcome)
        });

        match result {
            Ok(outcome) => ChangeOutcome::Updated(outcome),
            Err(error) => {
                tracing::error!("Failed to update {}: {}", relative, error);
                ChangeOutcome::Failed { relative, error }
            }
        }
    }

    fn relative_to_mod_root(&self, path: &Path) -> Option<String> {
        let mod_root = self.context.mod_root();
        relative_path(mod_root, path).or_else(|| {
            let canonical_root = fs::canonicalize(mod_root).ok()?;
            relative_path(&canonical_root, path)
        })
    }
}

/// Reserve a source's output paths for this run.
///
/// Fails without reserving anything when an earlier source already produces
/// one of them, so the later source is never written over the earlier one.
fn claim_outputs(
    claimed: &mut HashMap<String, String>,
    rules: &IgnoreRules,
    relative: &str,
) -> Result<(), TransformError> {
    let planned = planned_outputs(classify(relative, rules), relative);
    if let Some((dest, other)) =
        planned.iter().find_map(|dest| claimed.get(dest).map(|other| (dest, other)))
    {
        return Err(TransformError::Conflict { dest: dest.clone(), other: other.clone() });
    }
    for dest in planned {
        claimed.insert(dest, relative.to_string());
    }
    Ok(())
}

/// List every file under the mod root as sorted `/`-separated relative paths.
pub fn discover_files(mod_root: &Path) -> Result<Vec<String>, BuildError> {
    let pattern = format!("{}/**/*", Pattern::escape(&mod_root.to_string_lossy()));
    let entries = glob(&pattern).map_err(|e| BuildError::Discovery(e.to_string()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            BuildError::io(path, e.into())
        })?;
        if !path.is_file() {
            continue;
        }
        if let Some(relative) = relative_path(mod_root, &path) {
            files.push(relative);
        }
    }

    files.sort();
    Ok(files)
}

/// Check that the output folder can be deleted without touching anything else.
///
/// The folder must be a named child of the output root, and must neither
/// contain nor live inside the mod folder.
pub fn check_output_dir(ctx: &BuildContext) -> Result<(), BuildError> {
    let output_dir = ctx.output_dir();
    let unsafe_dir = || BuildError::UnsafeOutputDir(output_dir.clone());

    let name = ctx.output_name();
    if name.is_empty() || name == "." || name == ".." {
        return Err(unsafe_dir());
    }
    if output_dir.file_name().map(|n| n.to_string_lossy() != name).unwrap_or(true) {
        return Err(unsafe_dir());
    }

    let canonical_mod_root = canonical_or_self(ctx.mod_root());
    let canonical_output = canonical_or_self(ctx.output_root()).join(&name);
    if overlaps(ctx.mod_root(), &output_dir) || overlaps(&canonical_mod_root, &canonical_output) {
        return Err(unsafe_dir());
    }

    Ok(())
}

fn overlaps(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

fn canonical_or_self(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Recursively delete the previous output folder, if any.
fn clear_output_dir(ctx: &BuildContext) -> Result<(), BuildError> {
    check_output_dir(ctx)?;

    let output_dir = ctx.output_dir();
    if output_dir.exists() {
        tracing::info!("Deleting old output...");
        fs::remove_dir_all(&output_dir).map_err(|e| BuildError::io(&output_dir, e))?;
    }
    Ok(())
}

/// Write `<output name>.mod` next to the output folder.
///
/// Based on the mod's `descriptor.mod`, or a bare `name` line when the mod has
/// none.
fn write_outer_descriptor(ctx: &BuildContext) -> Result<PathBuf, TransformError> {
    let source = ctx.mod_root().join(DESCRIPTOR_FILE_NAME);
    let text = match fs::read(&source) {
        Ok(bytes) => {
            String::from_utf8(bytes).map_err(|_| TransformError::InvalidText { path: source })?
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!("No {} found, using the folder name", DESCRIPTOR_FILE_NAME);
            format!("name=\"{}\"\n", ctx.mod_name())
        }
        Err(e) => return Err(TransformError::Read { path: source, source: e }),
    };

    let rewritten = rewrite_descriptor(&text, &ctx.descriptor_output_path(), ctx.name_suffix());
    let dest = ctx.outer_descriptor_path();
    write_artifact(&dest, rewritten.as_bytes())?;

    tracing::debug!("Wrote descriptor {}", dest.display());
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_context() -> (TempDir, BuildContext) {
        let temp = TempDir::new().unwrap();
        let mod_root = temp.path().join("MyMod");
        fs::create_dir_all(&mod_root).unwrap();
        let ctx = BuildContext::new(mod_root, temp.path().join("mods"));
        (temp, ctx)
    }

    fn write(root: &Path, relative: &str, contents: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_discover_files_sorted_relative() {
        let (_temp, ctx) = create_test_context();
        write(ctx.mod_root(), "b.txt", b"b");
        write(ctx.mod_root(), "a/z.txt", b"z");
        write(ctx.mod_root(), "a/deep/y.txt", b"y");

        let files = discover_files(ctx.mod_root()).unwrap();
        assert_eq!(files, vec!["a/deep/y.txt", "a/z.txt", "b.txt"]);
    }

    #[test]
    fn test_claim_outputs_rejects_second_producer() {
        let rules = IgnoreRules::default();
        let mut claimed = HashMap::new();

        claim_outputs(&mut claimed, &rules, "gfx/flags/USA.png").unwrap();
        assert_eq!(
            claimed.get("gfx/flags/medium/USA.dds").map(String::as_str),
            Some("gfx/flags/USA.png")
        );

        let err = claim_outputs(&mut claimed, &rules, "gfx/flags/medium/USA.png").unwrap_err();
        match err {
            TransformError::Conflict { dest, other } => {
                assert_eq!(dest, "gfx/flags/medium/USA.dds");
                assert_eq!(other, "gfx/flags/USA.png");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // Nothing from the rejected source is reserved
        assert!(!claimed.contains_key("gfx/flags/medium/medium/USA.dds"));

        claim_outputs(&mut claimed, &rules, "gfx/flags/GER.png").unwrap();
        claim_outputs(&mut claimed, &rules, "ignored_files.mod").unwrap();
    }

    #[test]
    fn test_build_empty_mod() {
        let (_temp, ctx) = create_test_context();
        let mut pipeline = BuildPipeline::new(ctx.clone());

        let result = pipeline.build().unwrap();
        assert!(result.is_success());
        assert!(result.files.is_empty());
        assert!(ctx.output_dir().is_dir());

        let descriptor = fs::read_to_string(ctx.outer_descriptor_path()).unwrap();
        assert_eq!(
            descriptor,
            format!("name=\"MyMod\"\npath=\"{}\"\n", ctx.descriptor_output_path())
        );
    }

    #[test]
    fn test_build_missing_mod_root() {
        let temp = TempDir::new().unwrap();
        let ctx = BuildContext::new(temp.path().join("nope"), temp.path().join("mods"));
        let result = BuildPipeline::new(ctx).build();
        assert!(matches!(result, Err(BuildError::SourceNotFound(_))));
    }

    #[test]
    fn test_build_clears_previous_output() {
        let (_temp, ctx) = create_test_context();
        write(&ctx.output_dir(), "stale/old.txt", b"old");
        write(ctx.mod_root(), "fresh.txt", b"new");

        BuildPipeline::new(ctx.clone()).build().unwrap();
        assert!(!ctx.destination("stale/old.txt").exists());
        assert!(ctx.destination("fresh.txt").exists());
    }

    #[test]
    fn test_build_keeps_siblings_of_output() {
        let (_temp, ctx) = create_test_context();
        write(ctx.output_root(), "OtherMod/keep.txt", b"keep");

        BuildPipeline::new(ctx.clone()).build().unwrap();
        assert!(ctx.output_root().join("OtherMod/keep.txt").exists());
    }

    #[test]
    fn test_refuses_output_containing_mod_root() {
        let temp = TempDir::new().unwrap();
        let mod_root = temp.path().join("MyMod");
        fs::create_dir_all(&mod_root).unwrap();
        // Output root is the mod folder's parent, so output dir == mod root
        let ctx = BuildContext::new(&mod_root, temp.path());

        let result = BuildPipeline::new(ctx).build();
        assert!(matches!(result, Err(BuildError::UnsafeOutputDir(_))));
        assert!(mod_root.exists());
    }

    #[test]
    fn test_refuses_output_inside_mod_root() {
        let temp = TempDir::new().unwrap();
        let mod_root = temp.path().join("MyMod");
        fs::create_dir_all(&mod_root).unwrap();
        let ctx = BuildContext::new(&mod_root, mod_root.join("build"));

        assert!(matches!(check_output_dir(&ctx), Err(BuildError::UnsafeOutputDir(_))));
    }

    #[test]
    fn test_fail_fast_on_bad_image() {
        let (_temp, ctx) = create_test_context();
        write(ctx.mod_root(), "gfx/broken.png", b"not an image");

        let result = BuildPipeline::new(ctx).build();
        assert!(matches!(result, Err(BuildError::Transform { .. })));
    }

    #[test]
    fn test_keep_going_collects_failures() {
        let (_temp, ctx) = create_test_context();
        let ctx = ctx.with_keep_going(true);
        write(ctx.mod_root(), "gfx/broken.png", b"not an image");
        write(ctx.mod_root(), "common/ok.txt", b"fine");

        let result = BuildPipeline::new(ctx.clone()).build().unwrap();
        assert!(!result.is_success());
        assert_eq!(result.failed_count(), 1);
        assert_eq!(result.written_count(), 1);
        assert!(ctx.destination("common/ok.txt").exists());
    }

    #[test]
    fn test_handle_change_outside_root() {
        let (temp, ctx) = create_test_context();
        let pipeline = BuildPipeline::new(ctx);
        let outcome = pipeline.handle_change(&temp.path().join("elsewhere.txt"));
        assert!(matches!(outcome, ChangeOutcome::Ignored(IgnoredChange::OutsideModRoot)));
    }

    #[test]
    fn test_handle_change_removed_file() {
        let (_temp, ctx) = create_test_context();
        let path = ctx.mod_root().join("gone.txt");
        let pipeline = BuildPipeline::new(ctx);
        let outcome = pipeline.handle_change(&path);
        assert!(matches!(outcome, ChangeOutcome::Ignored(IgnoredChange::NotAFile)));
    }

    #[test]
    fn test_handle_change_error_is_contained() {
        let (_temp, ctx) = create_test_context();
        write(ctx.mod_root(), "gfx/broken.png", b"junk");
        let path = ctx.mod_root().join("gfx/broken.png");

        let pipeline = BuildPipeline::new(ctx);
        let outcome = pipeline.handle_change(&path);
        assert!(outcome.is_failure());
    }

    #[test]
    fn test_handle_change_descriptor_refreshes_outer() {
        let (_temp, ctx) = create_test_context();
        write(ctx.mod_root(), "descriptor.mod", b"name=\"Old\"\n");
        let mut pipeline = BuildPipeline::new(ctx.clone());
        pipeline.build().unwrap();

        write(ctx.mod_root(), "descriptor.mod", b"name=\"New\"\n");
        let outcome = pipeline.handle_change(&ctx.mod_root().join("descriptor.mod"));
        assert!(matches!(outcome, ChangeOutcome::Updated(_)));

        let outer = fs::read_to_string(ctx.outer_descriptor_path()).unwrap();
        assert!(outer.starts_with("name=\"New\"\n"));
    }
}
