//! Entry point for the `nearby` command.
#![forbid(unsafe_code)]

use nearby_cli::CliError;

fn main() {
    match nearby_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("nearby: {err}");
            std::process::exit(1);
        }
    }
}
