//! dots - Command-line pixel-art sprite editor

use std::process::ExitCode;

use dotsmith::cli;

fn main() -> ExitCode {
    cli::run()
}
