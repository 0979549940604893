//! # Labpress Library
//!
//! This library compiles declarative lab content into a publishable form: a
//! normalized manifest plus a tree of rendered Markdown pages. It is used by
//! the `labpress` command-line tool, but every stage is available to other
//! applications as well.
//!
//! ## Quick Example
//!
//! ```
//! use labpress::config::CompilerConfig;
//! use labpress::environments::StaticEnvironmentSource;
//! use labpress::oci::StaticDigestResolver;
//! use labpress::phases::{self, Compiler};
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(
//!     dir.path().join("manifest.yaml"),
//!     "kind: tutorial\ntitle: Hello\n",
//! )
//! .unwrap();
//! std::fs::write(dir.path().join("index.md"), "Published to {{ channel }}").unwrap();
//!
//! let compiler = Compiler::new(
//!     CompilerConfig::default(),
//!     Box::new(StaticEnvironmentSource::new()),
//!     Box::new(StaticDigestResolver::new()),
//! );
//!
//! let output = phases::generate(&compiler, dir.path()).unwrap();
//! let index = output.get_file("index.md").unwrap().as_str().unwrap();
//! assert!(index.starts_with("---\nkind: tutorial\n"));
//! assert!(index.ends_with("Published to dev"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifests (`manifest`)**: the author-facing schema of `manifest.yaml`
//!   and the narrower schema it is published as.
//! - **Collaborators (`environments`, `oci`)**: base environment lookups and
//!   image digest resolution, both behind traits so tests can stub them.
//! - **Phases (`phases`)**: the resolution passes (inheritance, references,
//!   expansion, normalization) and the orchestrator that runs them.
//! - **Rendering (`render`)**: nested template scopes and the page layout of
//!   each content kind.
//! - **In-Memory Filesystem (`filesystem`)**: the staged output tree. Nothing
//!   touches the output directory until compilation has succeeded.
//!
//! ## Execution Flow
//!
//! For every content unit (the root, and each module and lesson of a course):
//!
//! 1.  **Inheritance**: merge declared machines with the base environment.
//! 2.  **References**: read startup file sources and pin drive images.
//! 3.  **Expansion**: fan tasks out per machine and user, resolving `needs`.
//! 4.  **Normalization**: project the result onto the publish schema.
//! 5.  **Rendering**: render the unit's pages through its template scope.
//!
//! Finally the staged tree is written to the output directory.

pub mod cache;
pub mod command;
pub mod config;
pub mod defaults;
pub mod environments;
pub mod error;
pub mod filesystem;
pub mod manifest;
pub mod oci;
pub mod output;
pub mod phases;
pub mod render;
pub mod suggestions;
