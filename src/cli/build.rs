//! Build command implementation

use std::process::ExitCode;

use super::{absolute_path, Cli, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::build::{BuildContext, BuildPipeline, BuildResult};
use crate::config::loader::{load_config, merge_cli_overrides, CliOverrides};

/// Run a full build, then watch if requested
pub fn run_build(cli: &Cli) -> ExitCode {
    let mod_root = match &cli.mod_path {
        Some(path) => absolute_path(path),
        None => match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(e) => {
                eprintln!("Error: cannot determine current directory: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        },
    };

    if !mod_root.is_dir() {
        eprintln!("Error: Mod directory not found: {}", mod_root.display());
        eprintln!("Specify the mod folder with --mod-path");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let config_path = cli.config.as_deref().map(absolute_path);
    let mut config = match load_config(config_path.as_deref(), &mod_root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let overrides = CliOverrides {
        output: cli.output.as_deref().map(absolute_path),
        dev: cli.dev.then_some(true),
        keep_going: cli.keep_going.then_some(true),
    };
    merge_cli_overrides(&mut config, &overrides);
    if let Some(output) = config.build.output.take() {
        config.build.output = Some(absolute_path(&output));
    }

    let context = BuildContext::from_mod_config(&mod_root, &config);
    let mut pipeline = BuildPipeline::new(context);

    match pipeline.build() {
        Ok(result) => {
            print_build_result(&result);
            if !result.is_success() && !cli.watch {
                return ExitCode::from(EXIT_ERROR);
            }
        }
        Err(e) => {
            eprintln!("Build failed: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    }

    if !cli.watch {
        return ExitCode::from(EXIT_SUCCESS);
    }

    println!("Starting watch mode...");
    println!("Press Ctrl+C to stop");
    println!();

    match crate::watch::watch(&pipeline, &config.watch) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("Watch error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn print_build_result(result: &BuildResult) {
    for failure in result.failures() {
        eprintln!("  {}: {}", failure.relative, failure.status);
    }
    println!("{}", result.summary());
    println!("  Output: {}", result.output_dir.display());
    println!("  Descriptor: {}", result.outer_descriptor.display());
}
