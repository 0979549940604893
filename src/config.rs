//! # Compiler Configuration
//!
//! [`CompilerConfig`] carries everything about a compilation run that does
//! not come from the content itself: the publish channel, where default images
//! and content bundles live, and which kinds skip title prefixing.
//!
//! There is no configuration file. The CLI fills this struct from flags and
//! environment variables, and library callers can start from
//! [`CompilerConfig::default`].
//!
//! ```
//! use labpress::config::CompilerConfig;
//! use labpress::manifest::ContentKind;
//!
//! let config = CompilerConfig::default().with_channel("beta");
//! assert!(!config.is_live());
//! assert!(config.is_beta());
//! assert!(config.prefixes_title(ContentKind::Challenge));
//! assert!(!config.prefixes_title(ContentKind::Lesson));
//! ```

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::defaults;
use crate::manifest::ContentKind;

#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Channel being published.
    pub channel: String,
    /// Name of the production channel.
    pub live_channel: String,
    /// Repository root for synthesized drive images.
    pub image_repo: String,
    /// Base URL content bundles are downloaded from.
    pub static_url: String,
    /// Kinds whose titles are never channel-prefixed.
    pub no_title_prefix: BTreeSet<ContentKind>,
    /// Base environments that pass no machine defaults down.
    pub standalone_bases: BTreeSet<String>,
    /// Global template directories, in load order.
    pub template_dirs: Vec<PathBuf>,
    /// External data directories, in load order.
    pub data_dirs: Vec<PathBuf>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            channel: defaults::CHANNEL.to_string(),
            live_channel: defaults::LIVE_CHANNEL.to_string(),
            image_repo: defaults::IMAGE_REPO.to_string(),
            static_url: defaults::STATIC_URL.to_string(),
            no_title_prefix: defaults::NO_TITLE_PREFIX_KINDS
                .iter()
                .filter_map(|k| ContentKind::parse(k))
                .collect(),
            standalone_bases: defaults::STANDALONE_BASES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            template_dirs: Vec::new(),
            data_dirs: Vec::new(),
        }
    }
}

impl CompilerConfig {
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    pub fn is_live(&self) -> bool {
        self.channel == self.live_channel
    }

    pub fn is_beta(&self) -> bool {
        self.channel.eq_ignore_ascii_case(defaults::BETA_CHANNEL)
    }

    /// Whether titles of `kind` get the channel prefix on this run.
    pub fn prefixes_title(&self, kind: ContentKind) -> bool {
        !self.is_live() && !self.no_title_prefix.contains(&kind)
    }

    /// Apply the channel prefix to a title if `kind` calls for it.
    pub fn title_for(&self, kind: ContentKind, title: &str) -> String {
        if self.prefixes_title(kind) {
            format!("{}: {}", self.channel.to_uppercase(), title)
        } else {
            title.to_string()
        }
    }

    pub fn is_standalone_base(&self, name: &str) -> bool {
        self.standalone_bases.contains(name)
    }
}
