//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = ContentFixture::new().with_manifest(manifests::CHALLENGE);
//! let output = fixture.generate("dev").unwrap();
//! ```

#![allow(dead_code)]

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

use labpress::config::CompilerConfig;
use labpress::environments::{BaseEnvironment, StaticEnvironmentSource};
use labpress::error::Result;
use labpress::filesystem::MemoryFS;
use labpress::oci::StaticDigestResolver;
use labpress::phases::{self, Compiler};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::{bases, manifests, page, split_page, ContentFixture, DIGEST};
}

/// Digest every test image resolves to.
pub const DIGEST: &str = "sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

/// Base environment manifests, as `labctl playground manifest` would print them.
pub mod bases {
    pub const UBUNTU: &str = r#"
name: ubuntu
playground:
  machines:
    - name: ubuntu-01
      users:
        - name: root
        - name: laborant
          default: true
      resources:
        cpuCount: 2
        ramSize: 4Gi
  initTasks:
    init_network:
      machine: ubuntu-01
      run: ip link
"#;
}

/// Content manifests used across tests.
pub mod manifests {
    pub const CHALLENGE: &str = r#"
kind: challenge
title: Fix the web server
description: Make nginx answer again
difficulty: easy
createdAt: "2024-05-01"
playground:
  name: ubuntu
  machines:
    - name: ubuntu-01
      hostname: web
tasks:
  verify_nginx:
    machine: ubuntu-01
    user: root
    needs: [init_network]
    run: curl -fsS localhost
"#;

    pub const COURSE: &str = r#"
kind: course
title: Linux Basics
slug: linux-basics
"#;

    pub const LESSON: &str = r#"
kind: lesson
title: Introduction
"#;

    pub const MODULE: &str = r#"
kind: module
title: Getting Started
"#;

    pub const TRAINING: &str = r#"
kind: training
title: Kubernetes Fundamentals
workingTitle: k8s-fundamentals
"#;

    pub const PLAYGROUND: &str = r#"
kind: playground
name: box
base: ubuntu
title: Ubuntu Box
description: A plain Ubuntu machine
channels:
  dev:
    name: box-dev
  live:
    name: box
    public: true
playground:
  machines:
    - name: ubuntu-01
  initTasks:
    init_motd:
      machine: ubuntu-01
      user: [root, laborant]
      run: echo hello > ~/.motd
"#;
}

/// A content directory in a temporary location.
pub struct ContentFixture {
    temp_dir: assert_fs::TempDir,
}

impl ContentFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `manifest.yaml` at the content root.
    pub fn with_manifest(self, content: &str) -> Self {
        self.with_file("manifest.yaml", content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add a base environment the CLI can find through `--base-dir`.
    pub fn with_base(self, name: &str, content: &str) -> Self {
        self.with_file(&format!("bases/{}.yaml", name), content)
    }

    /// Directory the content lives in.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    pub fn bases_dir(&self) -> PathBuf {
        self.temp_dir.path().join("bases")
    }

    /// A compiler with the `ubuntu` base and a digest for every test image.
    pub fn compiler(&self, channel: &str) -> Compiler {
        let ubuntu = BaseEnvironment::parse(bases::UBUNTU, "ubuntu").expect("valid base");
        Compiler::new(
            CompilerConfig::default().with_channel(channel),
            Box::new(StaticEnvironmentSource::new().with("ubuntu", ubuntu)),
            Box::new(StaticDigestResolver::new().with("ghcr.io/acme/rootfs:dev", DIGEST)),
        )
    }

    /// Compile the content in memory.
    pub fn generate(&self, channel: &str) -> Result<MemoryFS> {
        phases::generate(&self.compiler(channel), self.path())
    }

    /// A CLI command running in this fixture's directory, reading bases from
    /// `bases/`.
    pub fn command(&self, subcommand: &str) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("labpress");
        cmd.current_dir(self.path())
            .env_remove("LABPRESS_CHANNEL")
            .arg(subcommand)
            .arg("--base-dir")
            .arg(self.bases_dir());
        cmd
    }
}

impl Default for ContentFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Text of a staged file, panicking with its path when missing.
pub fn page(output: &MemoryFS, path: &str) -> String {
    output
        .get_file(path)
        .unwrap_or_else(|| panic!("missing output file {}", path))
        .as_str()
        .expect("page is UTF-8")
        .to_string()
}

/// Split a page into its front matter and body.
pub fn split_page(page: &str) -> (serde_yaml::Value, String) {
    let rest = page.strip_prefix("---\n").expect("page starts with front matter");
    let (front, body) = rest.split_once("\n---\n").expect("front matter is closed");
    let front = serde_yaml::from_str(front).expect("front matter is YAML");
    (front, body.to_string())
}
