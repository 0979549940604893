//! In-memory output tree
//!
//! Every page and copied asset of a run is staged here first and written to
//! disk in one go once compilation has succeeded.

use crate::error::{Error, Result};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// A staged output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// File content as bytes
    pub content: Vec<u8>,
}

impl File {
    /// Create a new file with content
    pub fn new(content: Vec<u8>) -> Self {
        Self { content }
    }

    /// Create a new file from string content
    pub fn from_string(content: &str) -> Self {
        Self::new(content.as_bytes().to_vec())
    }

    /// Content as UTF-8 text, if it is text
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.content).ok()
    }
}

/// Staged output tree keyed by path relative to the output directory
#[derive(Debug, Clone, Default)]
pub struct MemoryFS {
    files: BTreeMap<PathBuf, File>,
}

impl MemoryFS {
    /// Create a new empty filesystem
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a file. Paths must be relative and stay inside the tree.
    pub fn add_file<P: AsRef<Path>>(&mut self, path: P, file: File) -> Result<()> {
        let path = path.as_ref();
        let inside = path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !inside || path.as_os_str().is_empty() {
            return Err(Error::Filesystem {
                message: format!("invalid output path: {}", path.display()),
            });
        }
        self.files.insert(path.to_path_buf(), file);
        Ok(())
    }

    /// Add a file with content
    pub fn add_file_content<P: AsRef<Path>>(&mut self, path: P, content: Vec<u8>) -> Result<()> {
        self.add_file(path, File::new(content))
    }

    /// Add a file with string content
    pub fn add_file_string<P: AsRef<Path>>(&mut self, path: P, content: &str) -> Result<()> {
        self.add_file(path, File::from_string(content))
    }

    /// Get a file by path
    pub fn get_file<P: AsRef<Path>>(&self, path: P) -> Option<&File> {
        self.files.get(path.as_ref())
    }

    /// Check if a file exists
    pub fn exists<P: AsRef<Path>>(&self, path: P) -> bool {
        self.files.contains_key(path.as_ref())
    }

    /// List all files, sorted
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.files.keys().cloned().collect()
    }

    /// Get the number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if filesystem is empty
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over all files as (path, file) pairs
    pub fn files(&self) -> impl Iterator<Item = (&PathBuf, &File)> {
        self.files.iter()
    }

    /// Mirror every regular file below `source` into `target`, byte for byte.
    /// A missing `source` directory is not an error.
    pub fn copy_dir(&mut self, source: &Path, target: &Path) -> Result<usize> {
        if !source.is_dir() {
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(source).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Filesystem {
                message: format!("failed to walk {}: {}", source.display(), e),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|e| Error::Filesystem {
                    message: e.to_string(),
                })?;
            let content = std::fs::read(entry.path())?;
            self.add_file_content(target.join(relative), content)?;
            copied += 1;
        }

        Ok(copied)
    }
}
