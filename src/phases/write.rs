//! Writing to Disk
//!
//! The last step of a run: the staged output tree is written below the output
//! directory.
//!
//! ## Process
//!
//! 1.  **Prepare**: [`prepare_output`] clears the output directory when asked
//!     to, and refuses to write into a non-empty one otherwise. The
//!     `__static__` subdirectory is left alone either way.
//!
//! 2.  **Write**: [`execute`] creates parent directories as needed and writes
//!     every staged file.
//!
//! Nothing is written before compilation has finished, so a failed run leaves
//! the output directory as it was.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;

/// Output subdirectory for static assets. Content bundles are placed there
/// before a run, so it survives [`prepare_output`].
pub const STATIC_DIR: &str = "__static__";

/// Make `output_path` ready for writing.
///
/// With `clear`, everything in the output directory except [`STATIC_DIR`] is
/// removed first. Without it, anything other than [`STATIC_DIR`] in the
/// output directory is an error.
pub fn prepare_output(output_path: &Path, clear: bool) -> Result<()> {
    if !output_path.exists() {
        return Ok(());
    }

    let entries = fs::read_dir(output_path).map_err(|e| Error::Filesystem {
        message: format!(
            "Failed to read output directory '{}': {}",
            output_path.display(),
            e
        ),
    })?;

    for entry in entries {
        let entry = entry?;
        if entry.file_name() == STATIC_DIR {
            continue;
        }

        if !clear {
            return Err(Error::OutputNotEmpty {
                path: output_path.display().to_string(),
            });
        }

        let path = entry.path();
        log::debug!("clearing {}", path.display());
        let removed = if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        removed.map_err(|e| Error::Filesystem {
            message: format!("Failed to clear '{}': {}", path.display(), e),
        })?;
    }

    Ok(())
}

/// Write the staged output tree below `output_path`.
pub fn execute(final_fs: &MemoryFS, output_path: &Path) -> Result<()> {
    fs::create_dir_all(output_path).map_err(|e| Error::Filesystem {
        message: format!(
            "Failed to create directory '{}': {}",
            output_path.display(),
            e
        ),
    })?;

    for (relative_path, file) in final_fs.files() {
        let full_path = output_path.join(relative_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::Filesystem {
                message: format!("Failed to create directory '{}': {}", parent.display(), e),
            })?;
        }

        fs::write(&full_path, &file.content).map_err(|e| Error::Filesystem {
            message: format!("Failed to write file '{}': {}", full_path.display(), e),
        })?;
        log::trace!("wrote {}", full_path.display());
    }

    log::debug!(
        "wrote {} files to {}",
        final_fs.len(),
        output_path.display()
    );

    Ok(())
}
