//! # Labpress CLI
//!
//! This is the binary entry point for the `labpress` command-line tool.
//!
//! Its responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Setting up logging and colored output from the global flags.
//! - Executing the selected subcommand.
//!
//! The compiler itself lives in the `labpress` library crate; the binary is a
//! thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
