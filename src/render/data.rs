//! Template data
//!
//! Loads the key-value data exposed to templates as `extra`. Each file in a
//! data directory contributes one key, its file stem:
//!
//! - `.json` files are decoded as JSON
//! - `.yaml` / `.yml` files are decoded as YAML
//! - `.md` / `.markdown` files are kept as raw text
//!
//! Other files are ignored. External data directories are loaded first, in
//! order, and the unit's own `data/` directory last, so on conflicting keys
//! the unit wins.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Name of a unit's own data directory.
pub const DATA_DIR: &str = "data";

pub type Data = Map<String, Value>;

/// Load the external directories, then `unit_dir`. Unreadable external
/// directories are skipped with a warning; errors in the unit's own data are
/// fatal.
pub fn load(external: &[PathBuf], unit_dir: &Path) -> Result<Data> {
    let mut data = Data::new();

    for dir in external {
        match load_dir(dir) {
            Ok(loaded) => data.extend(loaded),
            Err(e) => log::warn!("skipping data directory {}: {}", dir.display(), e),
        }
    }

    if unit_dir.is_dir() {
        data.extend(load_dir(unit_dir)?);
    }

    Ok(data)
}

/// `base` with every key of `local` put on top.
pub fn overlay(base: &Data, local: Data) -> Data {
    let mut merged = base.clone();
    merged.extend(local);
    merged
}

/// Load every data file below `dir`.
pub fn load_dir(dir: &Path) -> Result<Data> {
    if !dir.is_dir() {
        return Err(Error::Data {
            path: dir.display().to_string(),
            message: "not a directory".to_string(),
        });
    }

    let mut data = Data::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| Error::Data {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(value) = load_file(path)? else {
            continue;
        };
        let Some(key) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };
        data.insert(key, value);
    }

    Ok(data)
}

fn load_file(path: &Path) -> Result<Option<Value>> {
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if !matches!(
        extension.as_str(),
        "json" | "yaml" | "yml" | "md" | "markdown"
    ) {
        return Ok(None);
    }

    let data_error = |message: String| Error::Data {
        path: path.display().to_string(),
        message,
    };

    let text = std::fs::read_to_string(path).map_err(|e| data_error(e.to_string()))?;
    let value = match extension.as_str() {
        "json" => serde_json::from_str(&text).map_err(|e| data_error(e.to_string()))?,
        "yaml" | "yml" => serde_yaml::from_str(&text).map_err(|e| data_error(e.to_string()))?,
        _ => Value::String(text),
    };

    Ok(Some(value))
}
