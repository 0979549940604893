//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand. It runs the complete
//! compilation (every resolution pass and every template render) without
//! touching the output directory, and reports the first error it meets.
//!
//! Base environment lookups and digest resolution still run, so a successful
//! validation means `generate` would succeed with the same flags.

use anyhow::Result;
use clap::Args;

use labpress::filesystem::MemoryFS;
use labpress::output::{emoji, OutputConfig};
use labpress::phases;

use super::CompileArgs;

/// Compile a content directory without writing anything
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub compile: CompileArgs,

    /// List every page that would be written
    #[arg(long)]
    pub list: bool,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let root = &args.compile.path;
    println!(
        "{} Validating content: {}",
        emoji(&out, "🔍", "[SCAN]"),
        root.display()
    );

    args.compile.ensure_manifest()?;
    let compiler = args.compile.compiler()?;

    let staged = match phases::generate(&compiler, root) {
        Ok(staged) => staged,
        Err(e) => {
            println!("{} Validation failed: {}", emoji(&out, "❌", "[ERR]"), e);
            return Err(anyhow::anyhow!("Validation failed: {}", e));
        }
    };

    println!(
        "{} Content is valid ({} files)",
        emoji(&out, "✅", "[OK]"),
        staged.len()
    );
    if args.list {
        print_files(&staged);
    }

    Ok(())
}

fn print_files(staged: &MemoryFS) {
    for path in staged.list_files() {
        println!("   {}", path.display());
    }
}
