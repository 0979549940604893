//! Generate command implementation
//!
//! Compiles the content directory and writes the result:
//! 1. Resolve the manifest (inheritance, references, task expansion)
//! 2. Render every page of the unit in memory
//! 3. Prepare the output directory (refuse or clear stale output)
//! 4. Write the staged tree to disk

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use labpress::defaults;
use labpress::error::Error;
use labpress::output::{OutputConfig, Reporter};
use labpress::phases;
use labpress::suggestions;

use super::CompileArgs;

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub compile: CompileArgs,

    /// Output directory (defaults to <PATH>/dist)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Remove previous output before writing
    #[arg(long)]
    pub clear: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the generate command
pub fn execute(args: GenerateArgs, color_flag: &str) -> Result<()> {
    let reporter = Reporter::new(OutputConfig::from_env_and_flag(color_flag), args.quiet);
    let start_time = Instant::now();

    args.compile.ensure_manifest()?;
    let root = &args.compile.path;
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| defaults::output_dir(root));

    reporter.step("Compiling", root.display());
    reporter.detail(format!("channel: {}", args.compile.channel));

    let compiler = args.compile.compiler()?;
    match phases::execute_generate(&compiler, root, &output_dir, args.clear) {
        Ok(staged) => {
            reporter.success(format!(
                "Generated {} files in {:.2}s",
                staged.len(),
                start_time.elapsed().as_secs_f64()
            ));
            reporter.detail(format!("Files written to: {}", output_dir.display()));
            Ok(())
        }
        Err(Error::OutputNotEmpty { .. }) => {
            reporter.failure("Generation failed");
            Err(suggestions::output_not_empty(&output_dir))
        }
        Err(e) => {
            reporter.failure("Generation failed");
            Err(e.into())
        }
    }
}
