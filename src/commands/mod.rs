//! # CLI Command Implementations
//!
//! Each subcommand of `labpress` lives in its own file, with an `Args` struct
//! derived using `clap` and an `execute` function that calls into the
//! `labpress` library.
//!
//! `generate` and `validate` compile content the same way, so they share
//! [`CompileArgs`], the flags that make up a [`CompilerConfig`] and the two
//! external collaborators.

pub mod completions;
pub mod generate;
pub mod validate;

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use labpress::config::CompilerConfig;
use labpress::defaults;
use labpress::environments::{
    BaseEnvironmentSource, CommandEnvironmentSource, DirectoryEnvironmentSource,
};
use labpress::manifest::{ContentKind, MANIFEST_FILE};
use labpress::oci::CommandDigestResolver;
use labpress::phases::Compiler;
use labpress::suggestions;

/// Flags shared by every command that compiles content
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Content directory containing manifest.yaml
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    /// Channel to publish
    #[arg(long, value_name = "NAME", env = "LABPRESS_CHANNEL", default_value = defaults::CHANNEL)]
    pub channel: String,

    /// Name of the production channel
    #[arg(long, value_name = "NAME", default_value = defaults::LIVE_CHANNEL)]
    pub live_channel: String,

    /// Repository root for default drive images
    #[arg(long, value_name = "REPO", env = "LABPRESS_IMAGE_REPO", default_value = defaults::IMAGE_REPO)]
    pub image_repo: String,

    /// Base URL content bundles are downloaded from
    #[arg(long, value_name = "URL", env = "LABPRESS_STATIC_URL", default_value = defaults::STATIC_URL)]
    pub static_url: String,

    /// Kinds whose titles never get the channel prefix (repeatable)
    #[arg(
        long,
        value_name = "KIND",
        default_values = ["lesson", "module"],
        value_parser = parse_kind
    )]
    pub no_title_prefix: Vec<ContentKind>,

    /// Directory of global templates (repeatable, later ones win)
    #[arg(long = "template-dir", value_name = "DIR")]
    pub template_dirs: Vec<PathBuf>,

    /// Directory of extra template data (repeatable, later ones win)
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dirs: Vec<PathBuf>,

    /// Read base environments from <DIR>/<name>.yaml instead of running the base command
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Command that prints a base environment manifest, given its name
    #[arg(long, value_name = "COMMAND", env = "LABPRESS_BASE_COMMAND", default_value = defaults::BASE_COMMAND)]
    pub base_command: String,

    /// Command that prints the digest of an image reference
    #[arg(long, value_name = "COMMAND", env = "LABPRESS_DIGEST_COMMAND", default_value = defaults::DIGEST_COMMAND)]
    pub digest_command: String,
}

impl CompileArgs {
    pub fn config(&self) -> CompilerConfig {
        CompilerConfig {
            channel: self.channel.clone(),
            live_channel: self.live_channel.clone(),
            image_repo: self.image_repo.clone(),
            static_url: self.static_url.clone(),
            no_title_prefix: self.no_title_prefix.iter().copied().collect::<BTreeSet<_>>(),
            template_dirs: self.template_dirs.clone(),
            data_dirs: self.data_dirs.clone(),
            ..CompilerConfig::default()
        }
    }

    pub fn compiler(&self) -> Result<Compiler> {
        let environments: Box<dyn BaseEnvironmentSource> = match &self.base_dir {
            Some(dir) => Box::new(DirectoryEnvironmentSource::new(dir)),
            None => Box::new(CommandEnvironmentSource::new(&self.base_command)?),
        };
        let resolver = CommandDigestResolver::new(&self.digest_command)?;

        Ok(Compiler::new(self.config(), environments, Box::new(resolver)))
    }

    /// Fail early, with a hint, when the content directory has no manifest.
    pub fn ensure_manifest(&self) -> Result<()> {
        let manifest = self.path.join(MANIFEST_FILE);
        if !manifest.is_file() {
            return Err(suggestions::manifest_not_found(&manifest));
        }
        Ok(())
    }
}

fn parse_kind(value: &str) -> std::result::Result<ContentKind, String> {
    ContentKind::parse(value).ok_or_else(|| format!("unknown content kind '{}'", value))
}
