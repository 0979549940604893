//! # Manifest Schema
//!
//! Author-facing manifest types. Every content unit has a `manifest.yaml` at
//! its root. Its `kind` decides which of the two top-level shapes applies:
//!
//! - [`EnvironmentManifest`] for `kind: playground` (environment-only content).
//! - [`ContentManifest`] for everything else (challenges, tutorials, courses,
//!   trainings, and the lessons and modules nested inside courses).
//!
//! The publish-ready projections of both live in [`publish`].
//!
//! ## Example
//!
//! ```
//! use labpress::manifest::{ContentKind, ContentManifest};
//!
//! let yaml = r#"
//! kind: challenge
//! title: Fix the web server
//! difficulty: easy
//! playground:
//!   name: ubuntu
//! tasks:
//!   verify:
//!     machine: web
//!     user: root
//!     run: curl -fsS localhost
//! "#;
//!
//! let manifest = ContentManifest::parse(yaml, "manifest.yaml").unwrap();
//! assert_eq!(manifest.kind, ContentKind::Challenge);
//! assert_eq!(manifest.tasks.len(), 1);
//! ```

pub mod environment;
pub mod publish;
pub mod task;

pub use environment::{
    AccessControl, DriveSpec, EnvironmentSpec, MachineSpec, Resources, StartupFileSpec, UserSpec,
};
pub use task::{StringList, TaskSpec};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

/// File name of the manifest at the root of every content unit.
pub const MANIFEST_FILE: &str = "manifest.yaml";

/// Kinds of content units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Challenge,
    Tutorial,
    Course,
    Training,
    Playground,
    Lesson,
    Module,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Challenge => "challenge",
            ContentKind::Tutorial => "tutorial",
            ContentKind::Course => "course",
            ContentKind::Training => "training",
            ContentKind::Playground => "playground",
            ContentKind::Lesson => "lesson",
            ContentKind::Module => "module",
        }
    }

    /// Plural form, used in default image repository paths.
    pub fn plural(self) -> &'static str {
        match self {
            ContentKind::Challenge => "challenges",
            ContentKind::Tutorial => "tutorials",
            ContentKind::Course => "courses",
            ContentKind::Training => "trainings",
            ContentKind::Playground => "playgrounds",
            ContentKind::Lesson => "lessons",
            ContentKind::Module => "modules",
        }
    }

    /// Whether units of this kind run inside an environment of their own.
    pub fn has_environment(self) -> bool {
        !matches!(
            self,
            ContentKind::Course | ContentKind::Training | ContentKind::Module
        )
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "challenge" => Some(ContentKind::Challenge),
            "tutorial" => Some(ContentKind::Tutorial),
            "course" => Some(ContentKind::Course),
            "training" => Some(ContentKind::Training),
            "playground" => Some(ContentKind::Playground),
            "lesson" => Some(ContentKind::Lesson),
            "module" => Some(ContentKind::Module),
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-channel publish data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Channel {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub public: bool,
}

/// An embedded reference to another content unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lessons: Vec<String>,
}

/// Manifest of a challenge, tutorial, course, training, lesson or module.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentManifest {
    pub kind: ContentKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channels: BTreeMap<String, Channel>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, rename = "tagz")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub playground: EnvironmentSpec,
    #[serde(default)]
    pub tasks: BTreeMap<String, TaskSpec>,

    // Challenge
    #[serde(default)]
    pub difficulty: String,

    // Course and training
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub challenges: BTreeMap<String, Embed>,
    #[serde(default)]
    pub tutorials: BTreeMap<String, Embed>,
    #[serde(default)]
    pub courses: BTreeMap<String, Embed>,

    // Training
    #[serde(default)]
    pub working_title: String,
}

impl ContentManifest {
    /// Parse a content manifest from YAML text. `origin` is only used in
    /// error messages.
    pub fn parse(yaml: &str, origin: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::ManifestParse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Load `manifest.yaml` from a content directory.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let (text, origin) = read_manifest(dir)?;
        Self::parse(&text, &origin)
    }
}

/// Manifest of environment-only content (`kind: playground`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentManifest {
    pub kind: ContentKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub base: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channels: BTreeMap<String, Channel>,
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub playground: EnvironmentSpec,
}

impl EnvironmentManifest {
    pub fn parse(yaml: &str, origin: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::ManifestParse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_dir(dir: &Path) -> Result<Self> {
        let (text, origin) = read_manifest(dir)?;
        Self::parse(&text, &origin)
    }
}

#[derive(Deserialize)]
struct KindProbe {
    kind: String,
}

/// Read only the `kind` of the manifest in `dir`.
pub fn probe_kind(dir: &Path) -> Result<ContentKind> {
    let (text, origin) = read_manifest(dir)?;
    let probe: KindProbe = serde_yaml::from_str(&text).map_err(|e| Error::ManifestParse {
        path: origin.clone(),
        message: e.to_string(),
    })?;

    ContentKind::parse(&probe.kind).ok_or_else(|| Error::ManifestParse {
        path: origin,
        message: format!("unknown content kind '{}'", probe.kind),
    })
}

fn read_manifest(dir: &Path) -> Result<(String, String)> {
    let path = dir.join(MANIFEST_FILE);
    if !path.is_file() {
        return Err(Error::ManifestNotFound {
            path: path.display().to_string(),
        });
    }
    let text = std::fs::read_to_string(&path)?;
    Ok((text, path.display().to_string()))
}

/// Look up the requested channel, listing the declared ones on failure.
pub(crate) fn select_channel<'a>(
    channels: &'a BTreeMap<String, Channel>,
    channel: &str,
) -> Result<&'a Channel> {
    channels.get(channel).ok_or_else(|| {
        let names: Vec<&str> = channels.keys().map(String::as_str).collect();
        Error::MissingChannel {
            channel: channel.to_string(),
            available: if names.is_empty() {
                "none".to_string()
            } else {
                names.join(", ")
            },
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_kind_plural() {
        assert_eq!(ContentKind::Challenge.plural(), "challenges");
        assert_eq!(ContentKind::Playground.plural(), "playgrounds");
        assert_eq!(ContentKind::Training.plural(), "trainings");
    }

    #[test]
    fn test_kind_has_environment() {
        assert!(ContentKind::Challenge.has_environment());
        assert!(ContentKind::Lesson.has_environment());
        assert!(!ContentKind::Course.has_environment());
        assert!(!ContentKind::Module.has_environment());
        assert!(!ContentKind::Training.has_environment());
    }

    #[test]
    fn test_parse_content_manifest() {
        let yaml = r#"
kind: course
title: Containers 101
slug: containers-101
tagz: [docker]
channels:
  live:
    name: containers-101
    public: true
"#;
        let manifest = ContentManifest::parse(yaml, "manifest.yaml").unwrap();
        assert_eq!(manifest.kind, ContentKind::Course);
        assert_eq!(manifest.tags, vec!["docker"]);
        assert!(manifest.channels["live"].public);
        assert!(manifest.tasks.is_empty());
    }

    #[test]
    fn test_parse_unknown_kind_is_error() {
        let result = ContentManifest::parse("kind: podcast\n", "manifest.yaml");
        assert!(matches!(result, Err(Error::ManifestParse { .. })));
    }

    #[test]
    fn test_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let result = ContentManifest::from_dir(temp.path());
        assert!(matches!(result, Err(Error::ManifestNotFound { .. })));
    }

    #[test]
    fn test_probe_kind() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(MANIFEST_FILE),
            "kind: playground\nbase: ubuntu\n",
        )
        .unwrap();
        assert_eq!(probe_kind(temp.path()).unwrap(), ContentKind::Playground);
    }

    #[test]
    fn test_select_channel() {
        let mut channels = BTreeMap::new();
        channels.insert(
            "dev".to_string(),
            Channel {
                name: "box-dev".to_string(),
                public: false,
            },
        );
        channels.insert("live".to_string(), Channel::default());

        assert_eq!(select_channel(&channels, "dev").unwrap().name, "box-dev");

        let err = select_channel(&channels, "beta").unwrap_err();
        assert!(err.to_string().contains("available: dev, live"));
    }
}
