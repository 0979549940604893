//! Per-kind output topology
//!
//! Every content unit gets a root `index.md`: the published manifest as front
//! matter, followed by the rendered `index.md` template. What comes next
//! depends on the kind:
//!
//! | Kind       | Extra pages                                                   |
//! |------------|---------------------------------------------------------------|
//! | challenge  | `solution.md`, when the unit has one                          |
//! | tutorial   | none                                                          |
//! | course     | `<lesson>/…` or `<module>/<lesson>/…`, plus module index pages |
//! | training   | `program.md`, when present, and one page per `units/*.md`     |
//!
//! Environment-only content never gets here; it publishes a manifest file
//! instead of pages.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tera::Context;

use super::data::{self, Data};
use super::front_matter::{self, BETA_NOTICE};
use super::layout::{self, CourseLayout, ModuleDir};
use super::scope::{TemplateScope, MODULE_PATTERNS, PAGE_PATTERNS};
use crate::error::{Error, Result};
use crate::filesystem::MemoryFS;
use crate::manifest::publish::PublishedContent;
use crate::manifest::{ContentKind, ContentManifest};
use crate::phases::orchestrator::{directory_name, Compiler};
use crate::phases::write::STATIC_DIR;

/// Root page of a content unit, both as template and as output file.
pub const INDEX_PAGE: &str = "index.md";

/// Index page of a lesson or module output directory.
pub const UNIT_INDEX_PAGE: &str = "00-index.md";

pub const SOLUTION_PAGE: &str = "solution.md";

pub const PROGRAM_PAGE: &str = "program.md";

/// Directory of a training's unit pages.
pub const UNITS_DIR: &str = "units";

/// Input directory mirrored into `__static__`.
pub const STATIC_SOURCE_DIR: &str = "static";

/// Values shared by every page of one content unit.
struct Page<'a> {
    channel: &'a str,
    name: &'a str,
    extra: &'a Data,
}

impl Page<'_> {
    fn context<T: Serialize + ?Sized>(&self, manifest: &T) -> Context {
        let mut context = Context::new();
        context.insert("channel", self.channel);
        context.insert("manifest", manifest);
        context.insert("name", self.name);
        context.insert("extra", self.extra);
        context
    }
}

/// Render the content unit at `root` into `output`.
pub fn render(compiler: &Compiler, root: &Path, output: &mut MemoryFS) -> Result<()> {
    let config = compiler.config();
    let manifest = ContentManifest::from_dir(root)?;
    let published = compiler.compile_content_manifest(&manifest, root)?;

    let scope = TemplateScope::global(root, &config.template_dirs)?.compose(root, PAGE_PATTERNS)?;
    let extra = data::load(&config.data_dirs, &root.join(data::DATA_DIR))?;
    let name = directory_name(root);
    let page = Page {
        channel: &config.channel,
        name: &name,
        extra: &extra,
    };
    let context = page.context(&published);

    let mut body = String::new();
    if config.is_beta() {
        body.push_str(BETA_NOTICE);
    }
    if scope.has_template(INDEX_PAGE) {
        body.push_str(&scope.render(INDEX_PAGE, &context)?);
    }
    output.add_file_string(INDEX_PAGE, &front_matter::page(&published, &body)?)?;
    log::debug!("rendered {}", INDEX_PAGE);

    output.copy_dir(&root.join(STATIC_SOURCE_DIR), Path::new(STATIC_DIR))?;

    match manifest.kind {
        ContentKind::Challenge => {
            render_root_page(root, &scope, SOLUTION_PAGE, &context, output)?;
        }
        ContentKind::Course => {
            let course = Course {
                compiler,
                root,
                scope: &scope,
                page: &page,
                manifest: &published,
            };
            course.render(output)?;
        }
        ContentKind::Training => {
            render_root_page(root, &scope, PROGRAM_PAGE, &context, output)?;
            render_training_units(root, &scope, &context, output)?;
        }
        _ => {}
    }

    Ok(())
}

/// Render `name` to the output root if the unit has a file of that name.
fn render_root_page(
    root: &Path,
    scope: &TemplateScope,
    name: &str,
    context: &Context,
    output: &mut MemoryFS,
) -> Result<()> {
    if !root.join(name).is_file() {
        return Ok(());
    }

    output.add_file_string(name, &scope.render(name, context)?)?;
    log::debug!("rendered {}", name);
    Ok(())
}

fn render_training_units(
    root: &Path,
    scope: &TemplateScope,
    context: &Context,
    output: &mut MemoryFS,
) -> Result<()> {
    let units_dir = root.join(UNITS_DIR);
    if !units_dir.is_dir() {
        return Ok(());
    }

    let units = markdown_files(&units_dir)?;
    let scope = scope.compose(&units_dir, PAGE_PATTERNS)?;

    let mut rendered = 0;
    for unit in &units {
        if unit == INDEX_PAGE {
            log::warn!(
                "skipping {}/{}: it would replace the training index page",
                UNITS_DIR,
                unit
            );
            continue;
        }
        if output.exists(unit) {
            return Err(Error::DuplicateOutput { path: unit.clone() });
        }
        output.add_file_string(unit, &scope.render(unit, context)?)?;
        log::debug!("rendered unit {}", unit);
        rendered += 1;
    }

    log::info!("rendered {} training units", rendered);
    Ok(())
}

struct Course<'a> {
    compiler: &'a Compiler,
    root: &'a Path,
    scope: &'a TemplateScope,
    page: &'a Page<'a>,
    manifest: &'a PublishedContent,
}

impl Course<'_> {
    fn render(&self, output: &mut MemoryFS) -> Result<()> {
        let detected = CourseLayout::detect(self.root)?;
        log::info!("course has {} lessons", detected.lesson_count());

        match detected {
            CourseLayout::Empty => Ok(()),
            CourseLayout::Flat(lessons) => {
                for lesson in &lessons {
                    let target = PathBuf::from(layout::dir_name(lesson));
                    self.render_lesson(lesson, &target, self.scope, None, output)?;
                }
                Ok(())
            }
            CourseLayout::Modular(modules) => {
                for module in &modules {
                    self.render_module(module, output)?;
                }
                Ok(())
            }
        }
    }

    fn render_module(&self, module: &ModuleDir, output: &mut MemoryFS) -> Result<()> {
        let mut manifest = ContentManifest::from_dir(&module.path)?;
        manifest.kind = ContentKind::Module;
        let published = self
            .compiler
            .compile_content_manifest(&manifest, &module.path)?;

        let target = PathBuf::from(&module.name);
        output.add_file_string(
            target.join(UNIT_INDEX_PAGE),
            &front_matter::page(&published, "")?,
        )?;
        output.copy_dir(
            &module.path.join(STATIC_SOURCE_DIR),
            &target.join(STATIC_DIR),
        )?;
        log::debug!("rendered module {}", module.name);

        let scope = self.scope.compose(&module.path, MODULE_PATTERNS)?;
        for lesson in &module.lessons {
            let lesson_target = target.join(layout::dir_name(lesson));
            self.render_lesson(lesson, &lesson_target, &scope, Some(&published), output)?;
        }

        Ok(())
    }

    fn render_lesson(
        &self,
        dir: &Path,
        target: &Path,
        parent: &TemplateScope,
        module: Option<&PublishedContent>,
        output: &mut MemoryFS,
    ) -> Result<()> {
        let manifest = self.compiler.compile_content(dir)?;
        let scope = parent.compose(dir, PAGE_PATTERNS)?;
        let extra = data::overlay(self.page.extra, data::load(&[], &dir.join(data::DATA_DIR))?);

        let page = Page {
            extra: &extra,
            ..*self.page
        };
        let mut context = page.context(&manifest);
        context.insert("course", self.manifest);
        context.insert("module", &module);

        let body = if dir.join(INDEX_PAGE).is_file() {
            scope.render(INDEX_PAGE, &context)?
        } else {
            String::new()
        };
        output.add_file_string(
            target.join(UNIT_INDEX_PAGE),
            &front_matter::page(&manifest, &body)?,
        )?;

        for file in markdown_files(dir)? {
            if file == INDEX_PAGE {
                continue;
            }
            output.add_file_string(target.join(&file), &scope.render(&file, &context)?)?;
        }

        output.copy_dir(&dir.join(STATIC_SOURCE_DIR), &target.join(STATIC_DIR))?;
        log::debug!("rendered lesson {}", target.display());

        Ok(())
    }
}

/// Sorted names of the `*.md` files directly inside `dir`.
fn markdown_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".md") {
            files.push(name);
        }
    }
    files.sort();
    Ok(files)
}
