//! # Image References
//!
//! Drive sources with the `oci://` scheme name container images. Before
//! publishing, every such reference is pinned to an immutable digest so the
//! published environment never changes under its users.
//!
//! This module parses references and hides digest lookups behind the
//! [`DigestResolver`] trait:
//!
//! - [`CommandDigestResolver`] runs an external command (`crane digest` by
//!   default).
//! - [`StaticDigestResolver`] answers from an in-memory table.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use crate::command::ExternalCommand;
use crate::error::{Error, Result};

/// Scheme prefix of image drive sources.
pub const SCHEME: &str = "oci://";

/// Placeholder replaced with the active channel name.
pub const CHANNEL_PLACEHOLDER: &str = "__CHANNEL__";

/// Tag assumed when a reference has none.
pub const DEFAULT_TAG: &str = "latest";

/// A regex compiled on first use. The compile error, if any, is kept and
/// reported on every match attempt.
type Pattern = LazyLock<std::result::Result<Regex, regex::Error>>;

/// Optional registry host (may carry a port), then lowercase path components.
static REPOSITORY_PATTERN: Pattern = LazyLock::new(|| {
    Regex::new(
        r"^(?:[a-zA-Z0-9](?:[a-zA-Z0-9.-]*[a-zA-Z0-9])?(?::[0-9]+)?/)?[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*(?:/[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*)*$",
    )
});

static TAG_PATTERN: Pattern = LazyLock::new(|| Regex::new(r"^[\w][\w.-]{0,127}$"));

static DIGEST_PATTERN: Pattern =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:[.+_-][a-z0-9]+)*:[a-zA-Z0-9=_-]{32,}$"));

fn matches(pattern: &Pattern, text: &str) -> Result<bool> {
    let regex = pattern.as_ref().map_err(|e| Error::Regex(e.clone()))?;
    Ok(regex.is_match(text))
}

/// A parsed image reference: `repository[:tag][@digest]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    pub repository: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl ImageReference {
    /// Parse a reference without the `oci://` scheme.
    ///
    /// ```
    /// use labpress::oci::ImageReference;
    ///
    /// let reference = ImageReference::parse("ghcr.io/acme/rootfs:dev").unwrap();
    /// assert_eq!(reference.repository, "ghcr.io/acme/rootfs");
    /// assert_eq!(reference.tag.as_deref(), Some("dev"));
    /// assert!(!reference.is_pinned());
    /// ```
    pub fn parse(reference: &str) -> Result<Self> {
        let invalid = |message: &str| Error::ImageReference {
            reference: reference.to_string(),
            message: message.to_string(),
        };

        if reference.is_empty() {
            return Err(invalid("empty reference"));
        }

        let (name, digest) = match reference.split_once('@') {
            Some((name, digest)) => {
                if !matches(&DIGEST_PATTERN, digest)? {
                    return Err(invalid("malformed digest"));
                }
                (name, Some(digest.to_string()))
            }
            None => (reference, None),
        };

        // A colon after the last slash separates the tag; earlier colons belong to a registry port.
        let last_slash = name.rfind('/').map(|i| i + 1).unwrap_or(0);
        let (repository, tag) = match name[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                (&name[..split], Some(name[split + 1..].to_string()))
            }
            None => (name, None),
        };

        if !matches(&REPOSITORY_PATTERN, repository)? {
            return Err(invalid("malformed repository name"));
        }
        if let Some(tag) = &tag {
            if !matches(&TAG_PATTERN, tag)? {
                return Err(invalid("malformed tag"));
            }
        }

        Ok(Self {
            repository: repository.to_string(),
            tag,
            digest,
        })
    }

    pub fn is_pinned(&self) -> bool {
        self.digest.is_some()
    }

    /// `repository:tag`, with the default tag filled in.
    pub fn tagged(&self) -> String {
        format!(
            "{}:{}",
            self.repository,
            self.tag.as_deref().unwrap_or(DEFAULT_TAG)
        )
    }

    /// The tagged reference pinned to `digest`.
    pub fn pinned(&self, digest: &str) -> Self {
        Self {
            repository: self.repository.clone(),
            tag: Some(self.tag.clone().unwrap_or_else(|| DEFAULT_TAG.to_string())),
            digest: Some(digest.to_string()),
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repository)?;
        if let Some(tag) = &self.tag {
            write!(f, ":{}", tag)?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{}", digest)?;
        }
        Ok(())
    }
}

/// Resolves a mutable image reference to its current digest.
pub trait DigestResolver {
    fn resolve(&self, reference: &ImageReference) -> Result<String>;
}

/// Resolves digests by running an external command.
#[derive(Debug, Clone)]
pub struct CommandDigestResolver {
    command: ExternalCommand,
}

impl CommandDigestResolver {
    pub fn new(command_line: &str) -> Result<Self> {
        let command =
            ExternalCommand::parse(command_line).ok_or_else(|| Error::DigestResolution {
                reference: String::new(),
                message: "empty digest command".to_string(),
            })?;
        Ok(Self { command })
    }
}

impl DigestResolver for CommandDigestResolver {
    fn resolve(&self, reference: &ImageReference) -> Result<String> {
        let tagged = reference.tagged();
        let stdout = self
            .command
            .run(&tagged)
            .map_err(|message| Error::DigestResolution {
                reference: tagged.clone(),
                message,
            })?;

        let digest = stdout.trim();
        if !matches(&DIGEST_PATTERN, digest)? {
            return Err(Error::DigestResolution {
                reference: tagged,
                message: format!("unexpected digest output '{}'", digest),
            });
        }
        Ok(digest.to_string())
    }
}

/// Resolves digests from a fixed table keyed by `repository:tag`.
#[derive(Debug, Clone, Default)]
pub struct StaticDigestResolver {
    digests: HashMap<String, String>,
}

impl StaticDigestResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tagged: &str, digest: &str) -> Self {
        self.digests.insert(tagged.to_string(), digest.to_string());
        self
    }
}

impl DigestResolver for StaticDigestResolver {
    fn resolve(&self, reference: &ImageReference) -> Result<String> {
        let tagged = reference.tagged();
        self.digests
            .get(&tagged)
            .cloned()
            .ok_or_else(|| Error::DigestResolution {
                reference: tagged,
                message: "manifest unknown".to_string(),
            })
    }
}
