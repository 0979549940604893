//! # Output Configuration
//!
//! Utilities for the user-facing progress lines of the CLI. Progress goes to
//! stderr, so the generated pages (or completion scripts) on stdout stay
//! clean.
//!
//! ## Respecting User Preferences
//!
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//! - `--quiet` - Suppresses progress lines entirely
//!
//! ## Usage
//!
//! ```rust,ignore
//! use labpress::output::{OutputConfig, Reporter};
//!
//! let reporter = Reporter::new(OutputConfig::from_env_and_flag("auto"), false);
//! reporter.step("Compiling", "challenges/fix-it");
//! reporter.success("Wrote 4 files to dist");
//! ```

use std::env;
use std::fmt::Display;

use console::{style, Term};

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// - `always`: force colors on (overrides NO_COLOR)
    /// - `never`: force colors off
    /// - anything else: detect from the environment and stderr
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        Term::stderr().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `emoji_str` when colors are enabled, `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Writes progress lines to stderr.
#[derive(Debug, Clone)]
pub struct Reporter {
    config: OutputConfig,
    quiet: bool,
}

impl Reporter {
    pub fn new(config: OutputConfig, quiet: bool) -> Self {
        Self { config, quiet }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// A step in progress: `Compiling challenges/fix-it`.
    pub fn step(&self, verb: &str, subject: impl Display) {
        let verb = if self.config.use_color {
            style(verb).cyan().bold().to_string()
        } else {
            verb.to_string()
        };
        self.line(format!("{} {}", verb, subject));
    }

    /// Supplementary detail, indented below the last step.
    pub fn detail(&self, message: impl Display) {
        let message = if self.config.use_color {
            style(message.to_string()).dim().to_string()
        } else {
            message.to_string()
        };
        self.line(format!("   {}", message));
    }

    pub fn success(&self, message: impl Display) {
        let message = if self.config.use_color {
            style(message.to_string()).green().to_string()
        } else {
            message.to_string()
        };
        self.line(format!("{} {}", emoji(&self.config, "✅", "[OK]"), message));
    }

    /// Failures are reported even in quiet mode.
    pub fn failure(&self, message: impl Display) {
        let message = if self.config.use_color {
            style(message.to_string()).red().to_string()
        } else {
            message.to_string()
        };
        let _ = Term::stderr().write_line(&format!(
            "{} {}",
            emoji(&self.config, "❌", "[ERR]"),
            message
        ));
    }

    fn line(&self, line: String) {
        if self.quiet {
            return;
        }
        let _ = Term::stderr().write_line(&line);
    }
}
