//! # Error Handling
//!
//! This module defines the centralized error type for `labpress`. It uses the
//! `thiserror` library to derive a single `Error` enum that covers every
//! failure mode of a compilation run, and a `Result<T>` alias used throughout
//! the crate.
//!
//! The taxonomy follows the stages of the compiler:
//!
//! - **Input errors**: a missing or malformed manifest, or a course that
//!   declares both a `lessons` and a `modules` directory.
//! - **Resolution errors**: unresolved or mismatched task dependencies,
//!   tasks without targets, duplicate task instances, and a requested publish
//!   channel that the manifest does not declare.
//! - **Collaborator errors**: a failed base environment fetch, a failed
//!   digest lookup, an invalid image reference, or an unreadable startup file
//!   source.
//! - **Output errors**: template rendering failures and filesystem errors
//!   while staging or writing the output tree.
//!
//! No variant is ever recovered from inside the library: any error aborts the
//! whole compilation, and the caller decides what to do with the output
//! directory.

use thiserror::Error;

/// Main error type for labpress operations
#[derive(Error, Debug)]
pub enum Error {
    /// A manifest file does not exist at the expected location.
    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: String },

    /// A manifest file exists but could not be decoded.
    #[error("Manifest parsing error in {path}: {message}")]
    ManifestParse { path: String, message: String },

    /// A task needs a dependency that exists neither in the local task map
    /// nor among the base environment's init tasks.
    #[error("Unknown dependency '{dependency}' of task '{task}' (machine: {machine}, user: {user}){}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    UnknownDependency {
        task: String,
        dependency: String,
        machine: String,
        user: String,
        /// Optional "did you mean" hint
        hint: Option<String>,
    },

    /// A dependency exists but does not run on the machine of the dependent
    /// task instance.
    #[error("Invalid dependency '{dependency}' of task '{task}': it does not run on machine '{machine}' (user: {user})")]
    DependencyMachineMismatch {
        task: String,
        dependency: String,
        machine: String,
        user: String,
    },

    /// A dependency runs as multiple users but not as the user of the
    /// dependent task instance.
    #[error("Invalid dependency '{dependency}' of task '{task}': it does not run as user '{user}' (machine: {machine})")]
    DependencyUserMismatch {
        task: String,
        dependency: String,
        machine: String,
        user: String,
    },

    /// A task template declares no machines or no users.
    #[error("Task '{task}' declares no {field}")]
    EmptyTaskTarget { task: String, field: String },

    /// Two task templates expand to the same instance name.
    #[error("Duplicate task instance: {name}")]
    DuplicateTask { name: String },

    /// Two pages of one unit would be written to the same output path.
    #[error("Output path '{path}' is produced twice")]
    DuplicateOutput { path: String },

    /// The requested publish channel is not declared by the manifest.
    #[error("Missing channel data: {channel} (available: {available})")]
    MissingChannel { channel: String, available: String },

    /// A course declares both a flat and a modular layout.
    #[error("Course at {path} cannot have both 'lessons' and 'modules' directories")]
    AmbiguousCourseLayout { path: String },

    /// The base environment collaborator failed.
    #[error("Failed to fetch base environment '{name}': {message}")]
    BaseEnvironment { name: String, message: String },

    /// The digest resolution collaborator failed.
    #[error("Failed to resolve digest for {reference}: {message}")]
    DigestResolution { reference: String, message: String },

    /// An image reference could not be parsed.
    #[error("Invalid image reference '{reference}': {message}")]
    ImageReference { reference: String, message: String },

    /// A startup file refers to a source file that cannot be read.
    #[error("Failed to read startup file source {path}: {message}")]
    StartupFileSource { path: String, message: String },

    /// A template could not be parsed or rendered.
    #[error("Template error in {name}: {message}")]
    Template { name: String, message: String },

    /// A data file could not be read or decoded.
    #[error("Data file error in {path}: {message}")]
    Data { path: String, message: String },

    /// An error occurred while staging or writing the output tree.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// The output directory already contains files.
    #[error("Output directory '{path}' is not empty")]
    OutputNotEmpty { path: String },

    /// A mutex guarding a lookup cache has been poisoned.
    #[error("Lock poisoned: {context}")]
    LockPoisoned { context: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_unknown_dependency() {
        let error = Error::UnknownDependency {
            task: "setup_web".to_string(),
            dependency: "provision".to_string(),
            machine: "web".to_string(),
            user: "root".to_string(),
            hint: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("Unknown dependency 'provision'"));
        assert!(display.contains("setup_web"));
        assert!(display.contains("machine: web"));
        assert!(display.contains("user: root"));
        assert!(!display.contains("hint:"));
    }

    #[test]
    fn test_error_display_unknown_dependency_with_hint() {
        let error = Error::UnknownDependency {
            task: "setup".to_string(),
            dependency: "provison".to_string(),
            machine: "web".to_string(),
            user: "root".to_string(),
            hint: Some("Did you mean 'provision'?".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("hint: Did you mean 'provision'?"));
    }

    #[test]
    fn test_error_display_dependency_mismatch() {
        let error = Error::DependencyMachineMismatch {
            task: "setup_db".to_string(),
            dependency: "provision".to_string(),
            machine: "db".to_string(),
            user: "root".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("does not run on machine 'db'"));

        let error = Error::DependencyUserMismatch {
            task: "setup_web_admin".to_string(),
            dependency: "provision".to_string(),
            machine: "web".to_string(),
            user: "admin".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("does not run as user 'admin'"));
    }

    #[test]
    fn test_error_display_missing_channel() {
        let error = Error::MissingChannel {
            channel: "beta".to_string(),
            available: "dev, live".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Missing channel data: beta"));
        assert!(display.contains("dev, live"));
    }

    #[test]
    fn test_error_display_duplicate_output() {
        let error = Error::DuplicateOutput {
            path: "program.md".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Output path 'program.md' is produced twice"
        );
    }

    #[test]
    fn test_error_display_ambiguous_layout() {
        let error = Error::AmbiguousCourseLayout {
            path: "courses/intro".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("both 'lessons' and 'modules'"));
        assert!(display.contains("courses/intro"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(format!("{}", error).contains("YAML error"));
    }

    #[test]
    fn test_error_digest_resolution() {
        let error = Error::DigestResolution {
            reference: "ghcr.io/acme/box:dev".to_string(),
            message: "manifest unknown".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("ghcr.io/acme/box:dev"));
        assert!(display.contains("manifest unknown"));
    }
}
