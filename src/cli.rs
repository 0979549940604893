//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::WriteStyle;

use crate::commands;

/// Labpress - Compile lab content into publishable manifests and pages
#[derive(Parser, Debug)]
#[command(name = "labpress")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace). RUST_LOG takes precedence.
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "info",
        value_parser = ["error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a content directory and write the publishable output
    Generate(commands::generate::GenerateArgs),

    /// Compile a content directory without writing anything
    Validate(commands::validate::ValidateArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        self.init_logging();

        match self.command {
            Commands::Generate(args) => commands::generate::execute(args, &self.color),
            Commands::Validate(args) => commands::validate::execute(args, &self.color),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }

    fn init_logging(&self) {
        let env = env_logger::Env::default().default_filter_or(self.log_level.as_str());
        let style = match self.color.to_lowercase().as_str() {
            "always" => WriteStyle::Always,
            "never" => WriteStyle::Never,
            _ => WriteStyle::Auto,
        };

        // A logger may already be installed when the CLI runs inside tests.
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .write_style(style)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_flags() {
        let cli = Cli::try_parse_from([
            "labpress",
            "--log-level",
            "debug",
            "generate",
            "--path",
            "content",
            "--channel",
            "beta",
            "--clear",
            "--no-title-prefix",
            "lesson",
        ])
        .unwrap();

        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Generate(args) => {
                assert!(args.clear);
                assert_eq!(args.compile.channel, "beta");
                assert_eq!(args.compile.path.to_str(), Some("content"));
                assert_eq!(args.compile.no_title_prefix.len(), 1);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_log_level_is_rejected() {
        let result = Cli::try_parse_from(["labpress", "--log-level", "loud", "validate"]);
        assert!(result.is_err());
    }
}
