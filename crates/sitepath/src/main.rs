//! sitepath CLI - static site request path resolver.
//!
//! Provides commands for:
//! - `resolve`: Resolve a request URL against a site archive
//! - `extensions`: Show the extensions guessed for an Accept header

mod commands;
mod error;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExtensionsArgs, ResolveArgs};
use output::Output;

/// sitepath - static site request path resolver.
#[derive(Parser)]
#[command(name = "sitepath", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a request URL to an archive entry.
    Resolve(ResolveArgs),
    /// Print the file extensions guessed for an Accept header.
    Extensions(ExtensionsArgs),
}

/// Build the log filter.
///
/// `--verbose` shows every probe, otherwise use `RUST_LOG` or default to WARN.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Resolve(args) if args.verbose);

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Resolve(args) => tokio::runtime::Runtime::new()
            .map_err(error::CliError::from)
            .and_then(|rt| rt.block_on(args.execute(&output))),
        Commands::Extensions(args) => {
            args.execute(&output);
            Ok(true)
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}
