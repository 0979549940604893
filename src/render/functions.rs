//! Template helper functions and filters.
//!
//! Every scope registers these on its Tera instance:
//!
//! | Name | Kind | Arguments |
//! |---|---|---|
//! | `read_file` | function | `path` |
//! | `read_file_range` | function | `path`, `from`, `to` (1-based, inclusive) |
//! | `read_file_until` | function | `path`, `n` |
//! | `read_file_line` | function | `path`, `n` |
//! | `read_file_block` | function | `path`, `block` |
//! | `github_download_url` | function | `owner`, `repo`, `tag`, `asset` |
//! | `unindent_smart` | filter | |
//!
//! File paths are relative. They are looked up in the directory of the
//! innermost scope first and then in the directories of the enclosing scopes,
//! and they may not leave those directories.
//!
//! A block is delimited by marker lines, usually inside comments:
//!
//! ```text
//! // @block:setup
//! let x = 1;
//! // @endblock:setup
//! ```
//!
//! `@endblock` without a name closes any block.

use regex::Regex;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tera::{from_value, to_value, Tera, Value};

use crate::error::{Error, Result};

/// Resolves template file paths against a stack of scope directories.
#[derive(Debug, Clone, Default)]
pub struct FileResolver {
    /// Innermost first.
    roots: Vec<PathBuf>,
}

impl FileResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
        }
    }

    /// A resolver that looks in `dir` before the directories of `self`.
    pub fn nested(&self, dir: impl Into<PathBuf>) -> Self {
        let mut roots = Vec::with_capacity(self.roots.len() + 1);
        roots.push(dir.into());
        roots.extend(self.roots.iter().cloned());
        Self { roots }
    }

    /// Read a file relative to the scope directories.
    pub fn read(&self, relative: &str) -> Result<String> {
        let path = Path::new(relative);
        let contained = !relative.is_empty()
            && path
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            return Err(Error::Template {
                name: relative.to_string(),
                message: "file paths must be relative and stay inside the content directory"
                    .to_string(),
            });
        }

        for root in &self.roots {
            let candidate = root.join(path);
            if candidate.is_file() {
                return std::fs::read_to_string(&candidate).map_err(|e| Error::Template {
                    name: relative.to_string(),
                    message: format!("failed to read {}: {}", candidate.display(), e),
                });
            }
        }

        Err(Error::Template {
            name: relative.to_string(),
            message: "file not found".to_string(),
        })
    }
}

/// Lines `from..=to` (1-based) of `content`, joined with `\n`. A range past
/// the end of the text stops at the last line.
pub fn line_range(content: &str, from: i64, to: i64) -> Result<String> {
    if from <= 0 || to < from {
        return Err(Error::Template {
            name: "read_file_range".to_string(),
            message: format!("invalid line range: from={} to={}", from, to),
        });
    }

    let skip = (from - 1) as usize;
    let take = (to - from + 1) as usize;
    let lines: Vec<&str> = content
        .split('\n')
        .skip(skip)
        .take(take)
        .map(|line| line.trim_end_matches('\r'))
        .collect();

    Ok(lines.join("\n"))
}

/// The lines between `@block:<name>` and the next `@endblock[:<name>]`.
pub fn extract_block(content: &str, block: &str) -> Result<String> {
    let escaped = regex::escape(block);
    let start = Regex::new(&format!(r"@block:\s*{}\b", escaped))?;
    let end = Regex::new(&format!(r"@endblock(?::\s*{})?\b", escaped))?;

    let mut lines = Vec::new();
    let mut found = false;
    let mut closed = false;

    for line in content.lines() {
        if !found {
            found = start.is_match(line);
            continue;
        }
        if end.is_match(line) {
            closed = true;
            break;
        }
        lines.push(line);
    }

    if !found {
        return Err(Error::Template {
            name: "read_file_block".to_string(),
            message: format!("block '{}' not found", block),
        });
    }
    if !closed {
        return Err(Error::Template {
            name: "read_file_block".to_string(),
            message: format!("block '{}' is not properly closed", block),
        });
    }

    Ok(lines.join("\n"))
}

/// Remove the common leading-space indentation of all non-blank lines.
pub fn unindent_smart(value: &str) -> String {
    let indent = value
        .split('\n')
        .filter_map(|line| {
            let trimmed = line.trim_start_matches(' ');
            if trimmed.is_empty() {
                None
            } else {
                Some(line.len() - trimmed.len())
            }
        })
        .min()
        .unwrap_or(0);

    if indent == 0 {
        return value.to_string();
    }

    value
        .split('\n')
        .map(|line| line.get(indent..).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn github_download_url(owner: &str, repo: &str, tag: &str, asset: &str) -> String {
    format!(
        "https://github.com/{}/{}/releases/download/{}/{}",
        owner, repo, tag, asset
    )
}

fn arg<T: serde::de::DeserializeOwned>(
    args: &HashMap<String, Value>,
    function: &str,
    name: &str,
) -> tera::Result<T> {
    let value = args.get(name).ok_or_else(|| {
        tera::Error::msg(format!("`{}` requires the `{}` argument", function, name))
    })?;
    from_value(value.clone()).map_err(|e| {
        tera::Error::msg(format!(
            "`{}`: invalid `{}` argument: {}",
            function, name, e
        ))
    })
}

fn to_tera(result: Result<String>) -> tera::Result<Value> {
    let text = result.map_err(|e| tera::Error::msg(e.to_string()))?;
    to_value(text).map_err(tera::Error::from)
}

/// Register the helpers on `tera`, with file functions bound to `files`.
/// Registering again replaces the previous bindings.
pub fn register(tera: &mut Tera, files: &FileResolver) {
    let resolver = files.clone();
    tera.register_function("read_file", move |args: &HashMap<String, Value>| {
        let path: String = arg(args, "read_file", "path")?;
        to_tera(resolver.read(&path))
    });

    let resolver = files.clone();
    tera.register_function(
        "read_file_range",
        move |args: &HashMap<String, Value>| {
            let path: String = arg(args, "read_file_range", "path")?;
            let from: i64 = arg(args, "read_file_range", "from")?;
            let to: i64 = arg(args, "read_file_range", "to")?;
            to_tera(
                resolver
                    .read(&path)
                    .and_then(|content| line_range(&content, from, to)),
            )
        },
    );

    let resolver = files.clone();
    tera.register_function(
        "read_file_until",
        move |args: &HashMap<String, Value>| {
            let path: String = arg(args, "read_file_until", "path")?;
            let n: i64 = arg(args, "read_file_until", "n")?;
            to_tera(
                resolver
                    .read(&path)
                    .and_then(|content| line_range(&content, 1, n)),
            )
        },
    );

    let resolver = files.clone();
    tera.register_function("read_file_line", move |args: &HashMap<String, Value>| {
        let path: String = arg(args, "read_file_line", "path")?;
        let n: i64 = arg(args, "read_file_line", "n")?;
        to_tera(
            resolver
                .read(&path)
                .and_then(|content| line_range(&content, n, n)),
        )
    });

    let resolver = files.clone();
    tera.register_function(
        "read_file_block",
        move |args: &HashMap<String, Value>| {
            let path: String = arg(args, "read_file_block", "path")?;
            let block: String = arg(args, "read_file_block", "block")?;
            to_tera(
                resolver
                    .read(&path)
                    .and_then(|content| extract_block(&content, &block)),
            )
        },
    );

    tera.register_function(
        "github_download_url",
        |args: &HashMap<String, Value>| {
            let owner: String = arg(args, "github_download_url", "owner")?;
            let repo: String = arg(args, "github_download_url", "repo")?;
            let tag: String = arg(args, "github_download_url", "tag")?;
            let asset: String = arg(args, "github_download_url", "asset")?;
            to_tera(Ok(github_download_url(&owner, &repo, &tag, &asset)))
        },
    );

    tera.register_filter(
        "unindent_smart",
        |value: &Value, _: &HashMap<String, Value>| {
            let text: String = from_value(value.clone()).map_err(|e| {
                tera::Error::msg(format!("`unindent_smart` expects a string: {}", e))
            })?;
            to_value(unindent_smart(&text)).map_err(tera::Error::from)
        },
    );
}
