//! Command-line interface implementation
//!
//! Parses arguments, sets up logging and hands off to the build command.

mod build;

use clap::Parser;
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;

pub use build::run_build;

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// HOI4 Mod Helper - Build a Hearts of Iron IV mod folder into the game's mod directory
#[derive(Parser, Debug)]
#[command(name = "hoi4-mod-helper")]
#[command(about = "Build a Hearts of Iron IV mod: convert images to DDS, derive flags, write the launcher descriptor")]
#[command(version)]
pub struct Cli {
    /// Mod source folder (defaults to the current directory)
    #[arg(short = 'm', long = "mod-path")]
    pub mod_path: Option<PathBuf>,

    /// Folder that receives the built mod and its .mod descriptor
    /// (defaults to the game's mod folder)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep running and update changed files
    #[arg(short, long)]
    pub watch: bool,

    /// Build the dev variant (suffixed folder and descriptor name)
    #[arg(short, long)]
    pub dev: bool,

    /// Record failing files and continue instead of stopping at the first one
    #[arg(long)]
    pub keep_going: bool,

    /// Config file (defaults to hoi4mod.toml in the mod folder)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Show per-file progress
    #[arg(short, long)]
    pub verbose: bool,
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise INFO, or DEBUG with `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

/// Make a path absolute against the current directory and drop `.`/`..`
/// components without touching the filesystem.
pub(crate) fn absolute_path(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Run the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run_build(&cli)
}
