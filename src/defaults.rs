//! Default values for labpress configuration.
//!
//! This module provides centralized default values used across the library
//! and the commands, ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};

/// Output directory name, relative to the content root.
pub const OUTPUT_DIR: &str = "dist";

/// Channel used when none is requested.
pub const CHANNEL: &str = "dev";

/// The production channel. Titles are not prefixed on it.
pub const LIVE_CHANNEL: &str = "live";

/// Channel whose root pages get a warning notice.
pub const BETA_CHANNEL: &str = "beta";

/// Repository root for drive images that do not name one.
pub const IMAGE_REPO: &str = "ghcr.io/sagikazarmark/iximiuz-labs";

/// Base URL that serves content file bundles.
pub const STATIC_URL: &str = "https://labs.iximiuz.com";

/// Base environments that do not pass machine defaults down.
pub const STANDALONE_BASES: &[&str] = &["flexbox"];

/// Kinds whose titles never get a channel prefix.
pub const NO_TITLE_PREFIX_KINDS: &[&str] = &["lesson", "module"];

/// Size given to drives without one when an environment has many machines.
pub const DRIVE_SIZE: &str = "30GiB";

/// Machine count above which [`DRIVE_SIZE`] applies.
pub const DRIVE_SIZE_MACHINE_THRESHOLD: usize = 3;

/// Command that prints a base environment manifest as YAML.
pub const BASE_COMMAND: &str = "labctl playground manifest";

/// Command that prints the digest of an image reference.
pub const DIGEST_COMMAND: &str = "crane digest";

/// Returns the default output directory for a content root.
///
/// This can be overridden by the `--output` CLI flag.
pub fn output_dir(content_root: &Path) -> PathBuf {
    content_root.join(OUTPUT_DIR)
}
