//! Template scopes
//!
//! A [`TemplateScope`] is an immutable set of templates plus the helper
//! functions bound to its directories. Scopes form a chain:
//!
//! ```text
//! global (--template-dir) -> content root -> module -> lesson
//!                                         -> training units
//! ```
//!
//! [`TemplateScope::compose`] starts from a copy of the parent and parses the
//! child's own template files on top. A child template with the same name as
//! a parent template replaces it for the child; every other parent template
//! stays callable. The parent is never modified.
//!
//! Template names are file names, so `templates/note.md` is called `note.md`.

use std::error::Error as _;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tera::{Context, Tera};

use super::functions::{self, FileResolver};
use crate::error::{Error, Result};

/// Patterns of the template files a content root or lesson contributes.
pub const PAGE_PATTERNS: &[&str] = &["*.md", "templates/*.md"];

/// Patterns of the template files a module contributes.
pub const MODULE_PATTERNS: &[&str] = &["templates/*.md"];

#[derive(Debug, Clone)]
pub struct TemplateScope {
    tera: Tera,
    files: FileResolver,
}

impl TemplateScope {
    /// The global scope: every `*.md` in `template_dirs`, in order, with file
    /// functions bound to `root`.
    pub fn global(root: &Path, template_dirs: &[PathBuf]) -> Result<Self> {
        let mut tera = Tera::default();
        let files = FileResolver::new(root);
        functions::register(&mut tera, &files);

        let mut scope = Self { tera, files };
        for dir in template_dirs {
            if !dir.is_dir() {
                log::warn!("template directory {} does not exist", dir.display());
                continue;
            }
            let templates = collect(dir, &["*.md"])?;
            scope.add_templates(templates)?;
        }

        Ok(scope)
    }

    /// A child scope rooted at `dir` that adds the files matching `patterns`.
    pub fn compose(&self, dir: &Path, patterns: &[&str]) -> Result<Self> {
        let mut tera = self.tera.clone();
        let files = self.files.nested(dir);
        functions::register(&mut tera, &files);

        let mut scope = Self { tera, files };
        let templates = collect(dir, patterns)?;
        log::debug!(
            "scope {}: {} templates",
            dir.display(),
            templates.len()
        );
        scope.add_templates(templates)?;

        Ok(scope)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render the template `name` with the merged namespace.
    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        self.tera
            .render(name, context)
            .map_err(|e| template_error(name, &e))
    }

    fn add_templates(&mut self, templates: Vec<(String, String)>) -> Result<()> {
        if templates.is_empty() {
            return Ok(());
        }
        let names: Vec<String> = templates.iter().map(|(n, _)| n.clone()).collect();
        self.tera
            .add_raw_templates(templates)
            .map_err(|e| template_error(&names.join(", "), &e))
    }
}

/// Read the files below `dir` matching `patterns`, keyed by file name.
/// Later patterns win over earlier ones for the same name.
fn collect(dir: &Path, patterns: &[&str]) -> Result<Vec<(String, String)>> {
    let base = Pattern::escape(&dir.to_string_lossy());
    let mut templates = Vec::new();

    for pattern in patterns {
        let full = format!("{}/{}", base, pattern);
        let mut paths: Vec<PathBuf> = glob::glob(&full)?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    log::warn!("skipping unreadable template path: {}", e);
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        for path in paths {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            let source = std::fs::read_to_string(&path).map_err(|e| Error::Template {
                name: path.display().to_string(),
                message: e.to_string(),
            })?;
            templates.push((name, source));
        }
    }

    Ok(templates)
}

/// Flatten a Tera error and its causes into one message.
fn template_error(name: &str, error: &tera::Error) -> Error {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    Error::Template {
        name: name.to_string(),
        message,
    }
}
