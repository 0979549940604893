//! Running external lookup commands.
//!
//! Base environment manifests and image digests come from external tools
//! (`labctl`, `crane`). They are configured as a command line; the lookup
//! subject is appended as the last argument and stdout is the answer.

use std::process::Command;

/// A configured external command such as `labctl playground manifest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    /// Split a command line on whitespace. Returns `None` for an empty line.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(String::from);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Run the command with `subject` appended and return its stdout.
    ///
    /// The error is a human-readable message; callers wrap it in the error
    /// variant of their lookup.
    pub fn run(&self, subject: &str) -> std::result::Result<String, String> {
        log::debug!("running {} {} {}", self.program, self.args.join(" "), subject);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(subject)
            .output()
            .map_err(|e| format!("failed to run '{}': {}", self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            ));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| format!("'{}' produced invalid UTF-8: {}", self.program, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_line() {
        let command = ExternalCommand::parse("labctl playground  manifest").unwrap();
        assert_eq!(command.program, "labctl");
        assert_eq!(command.args, vec!["playground", "manifest"]);
    }

    #[test]
    fn test_parse_empty_command_line() {
        assert!(ExternalCommand::parse("   ").is_none());
    }

    #[test]
    #[cfg(unix)]
    fn test_run_appends_subject() {
        let command = ExternalCommand::parse("echo digest-of").unwrap();
        let output = command.run("ghcr.io/acme/box:dev").unwrap();
        assert_eq!(output.trim(), "digest-of ghcr.io/acme/box:dev");
    }

    #[test]
    fn test_run_missing_program() {
        let command = ExternalCommand::parse("labpress-no-such-tool").unwrap();
        let err = command.run("x").unwrap_err();
        assert!(err.contains("failed to run 'labpress-no-such-tool'"));
    }

    #[test]
    #[cfg(unix)]
    fn test_run_failing_program() {
        let command = ExternalCommand::parse("false").unwrap();
        let err = command.run("x").unwrap_err();
        assert!(err.contains("'false' exited with"));
    }
}
