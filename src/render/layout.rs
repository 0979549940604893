//! Course layouts
//!
//! A course keeps its lessons either directly under `lessons/` or grouped
//! under `modules/<module>/`. The layout is detected once, up front, and the
//! renderer matches on it.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directory of a flat course's lessons.
pub const LESSONS_DIR: &str = "lessons";

/// Directory of a modular course's modules.
pub const MODULES_DIR: &str = "modules";

/// Directory names that never hold a lesson or a module.
const RESERVED_DIRS: &[&str] = &["static", "templates", "data"];

/// A module and the lesson directories inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDir {
    pub name: String,
    pub path: PathBuf,
    pub lessons: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseLayout {
    /// Neither `lessons/` nor `modules/` exists.
    Empty,
    /// Lesson directories under `lessons/`.
    Flat(Vec<PathBuf>),
    /// Module directories under `modules/`.
    Modular(Vec<ModuleDir>),
}

impl CourseLayout {
    /// Detect the layout of the course at `root`.
    ///
    /// A course with both a `lessons/` and a `modules/` directory is rejected
    /// with [`Error::AmbiguousCourseLayout`].
    pub fn detect(root: &Path) -> Result<Self> {
        let lessons = root.join(LESSONS_DIR);
        let modules = root.join(MODULES_DIR);

        match (lessons.is_dir(), modules.is_dir()) {
            (true, true) => Err(Error::AmbiguousCourseLayout {
                path: root.display().to_string(),
            }),
            (true, false) => Ok(CourseLayout::Flat(unit_dirs(&lessons)?)),
            (false, true) => {
                let modules = unit_dirs(&modules)?
                    .into_iter()
                    .map(|path| {
                        let lessons = unit_dirs(&path)?;
                        Ok(ModuleDir {
                            name: dir_name(&path),
                            path,
                            lessons,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(CourseLayout::Modular(modules))
            }
            (false, false) => Ok(CourseLayout::Empty),
        }
    }

    /// Number of lessons across the whole course.
    pub fn lesson_count(&self) -> usize {
        match self {
            CourseLayout::Empty => 0,
            CourseLayout::Flat(lessons) => lessons.len(),
            CourseLayout::Modular(modules) => modules.iter().map(|m| m.lessons.len()).sum(),
        }
    }
}

/// Sorted child directories of `dir` that can hold a unit.
fn unit_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if RESERVED_DIRS.contains(&name.as_str()) {
            log::debug!("ignoring {} directory in {}", name, dir.display());
            continue;
        }

        dirs.push(entry.path());
    }

    dirs.sort();
    Ok(dirs)
}

pub(crate) fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
