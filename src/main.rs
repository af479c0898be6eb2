//! HOI4 Mod Helper - Command-line tool for building Hearts of Iron IV mods

use std::process::ExitCode;

use hoi4_mod_helper::cli;

fn main() -> ExitCode {
    cli::run()
}
