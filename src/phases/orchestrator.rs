//! Orchestrator for a complete generation run
//!
//! [`Compiler`] owns the configuration and the two external collaborators and
//! runs the resolution passes for one manifest at a time:
//!
//! 1. fetch the base environment (memoized per run)
//! 2. [`inheritance`](super::inheritance): merge declared machines with the base
//! 3. [`references`](super::references): read startup file sources, pin images
//! 4. [`expansion`](super::expansion): fan tasks out per machine and user
//! 5. [`normalize`](super::normalize): project onto the publish schema
//!
//! [`generate`] compiles a whole content directory into a staged output tree,
//! and [`execute_generate`] additionally writes it to disk.

use std::path::Path;

use super::normalize::{self, ResolvedEnvironment};
use super::{expansion, inheritance, references, write};
use crate::cache::LookupCache;
use crate::config::CompilerConfig;
use crate::environments::{BaseEnvironment, BaseEnvironmentSource};
use crate::error::Result;
use crate::filesystem::MemoryFS;
use crate::manifest::publish::{PublishedContent, PublishedEnvironment};
use crate::manifest::{
    self, ContentKind, ContentManifest, EnvironmentManifest, EnvironmentSpec, StringList,
    TaskSpec,
};
use crate::oci::DigestResolver;
use crate::render;

/// Task that unpacks the content bundle on content units.
pub const CONTENT_FILES_TASK: &str = "init_content_files";

/// Init task that unpacks the content bundle on environment-only content.
pub const ENVIRONMENT_FILES_TASK: &str = "init_files";

/// Compiles manifests against one configuration and one pair of collaborators.
pub struct Compiler {
    config: CompilerConfig,
    environments: Box<dyn BaseEnvironmentSource>,
    resolver: Box<dyn DigestResolver>,
    base_cache: LookupCache<BaseEnvironment>,
    digest_cache: LookupCache<String>,
}

impl Compiler {
    pub fn new(
        config: CompilerConfig,
        environments: Box<dyn BaseEnvironmentSource>,
        resolver: Box<dyn DigestResolver>,
    ) -> Self {
        Self {
            config,
            environments,
            resolver,
            base_cache: LookupCache::new("base environment"),
            digest_cache: LookupCache::new("digest"),
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Fetch a base environment, once per name and run.
    ///
    /// An empty name means the unit declares no base; it gets an empty one.
    pub fn base_environment(&self, name: &str) -> Result<BaseEnvironment> {
        if name.is_empty() {
            return Ok(BaseEnvironment::default());
        }

        self.base_cache.get_or_fetch(name, || {
            log::debug!("fetching base environment '{}'", name);
            let mut base = self.environments.fetch(name)?;
            if base.name.is_empty() {
                base.name = name.to_string();
            }
            Ok(base)
        })
    }

    /// Compile the manifest of a content unit (anything but a playground).
    pub fn compile_content(&self, dir: &Path) -> Result<PublishedContent> {
        let manifest = ContentManifest::from_dir(dir)?;
        self.compile_content_manifest(&manifest, dir)
    }

    /// Compile an already parsed content manifest whose unit lives in `dir`.
    pub fn compile_content_manifest(
        &self,
        manifest: &ContentManifest,
        dir: &Path,
    ) -> Result<PublishedContent> {
        let channel = if manifest.channels.is_empty() {
            None
        } else {
            Some(manifest::select_channel(
                &manifest.channels,
                &self.config.channel,
            )?)
        };

        if !manifest.kind.has_environment() {
            return Ok(normalize::content(manifest, None, channel, &self.config));
        }

        let content_name = channel
            .map(|c| c.name.clone())
            .filter(|name| !name.is_empty())
            .or_else(|| Some(manifest.name.clone()).filter(|name| !name.is_empty()))
            .unwrap_or_else(|| directory_name(dir));

        let mut tasks = manifest.tasks.clone();
        let resolved = self.resolve_environment(
            &manifest.playground,
            &manifest.playground.name,
            manifest.kind,
            &content_name,
            dir,
            |base, declared| {
                if let Some(task) = self.bundle_task(dir, manifest.kind, declared, base, false) {
                    tasks.insert(CONTENT_FILES_TASK.to_string(), task);
                }
            },
        )?;

        let (spec, base) = resolved;
        let tasks = expansion::expand(
            &tasks,
            &base.playground.init_tasks,
            expansion::InstanceNames::Keyed,
        )?;

        log::debug!(
            "{} '{}': {} machines, {} tasks",
            manifest.kind,
            content_name,
            spec.machines.len(),
            tasks.len()
        );

        Ok(normalize::content(
            manifest,
            Some(ResolvedEnvironment { spec, tasks }),
            channel,
            &self.config,
        ))
    }

    /// Compile an environment-only manifest.
    pub fn compile_environment(&self, dir: &Path) -> Result<PublishedEnvironment> {
        let manifest = EnvironmentManifest::from_dir(dir)?;
        let channel = manifest::select_channel(&manifest.channels, &self.config.channel)?;

        let content_name = if channel.name.is_empty() {
            if manifest.name.is_empty() {
                directory_name(dir)
            } else {
                manifest.name.clone()
            }
        } else {
            channel.name.clone()
        };

        let mut init_tasks = manifest.playground.init_tasks.clone();
        let (spec, base) = self.resolve_environment(
            &manifest.playground,
            &manifest.base,
            ContentKind::Playground,
            &content_name,
            dir,
            |base, declared| {
                if let Some(task) =
                    self.bundle_task(dir, ContentKind::Playground, declared, base, true)
                {
                    init_tasks.insert(ENVIRONMENT_FILES_TASK.to_string(), task);
                }
            },
        )?;

        let tasks = expansion::expand(
            &init_tasks,
            &base.playground.init_tasks,
            expansion::InstanceNames::Embedded,
        )?;

        let markdown = if manifest.markdown.is_empty() {
            read_markdown(dir)?
        } else {
            manifest.markdown.clone()
        };

        Ok(normalize::environment(
            &manifest,
            ResolvedEnvironment { spec, tasks },
            channel,
            markdown,
            &self.config,
        ))
    }

    /// Fetch the base, merge, and resolve references. `on_base` sees the
    /// base and the declared environment before any task is expanded.
    fn resolve_environment<F>(
        &self,
        declared: &EnvironmentSpec,
        base_name: &str,
        kind: ContentKind,
        content_name: &str,
        dir: &Path,
        on_base: F,
    ) -> Result<(EnvironmentSpec, BaseEnvironment)>
    where
        F: FnOnce(&BaseEnvironment, &EnvironmentSpec),
    {
        let base = self.base_environment(base_name)?;
        on_base(&base, declared);

        let standalone = self.config.is_standalone_base(base_name);
        let merged = inheritance::execute(declared, &base, standalone);

        let context = references::ReferenceContext {
            content_root: dir,
            channel: &self.config.channel,
            image_repo: &self.config.image_repo,
            kind,
            content_name,
            resolver: self.resolver.as_ref(),
            digests: &self.digest_cache,
        };
        let resolved = references::execute(&merged, &context)?;

        Ok((resolved, base))
    }

    /// The init task that unpacks `dist/__static__/<kind>.tar.gz`, if the
    /// bundle exists.
    fn bundle_task(
        &self,
        dir: &Path,
        kind: ContentKind,
        declared: &EnvironmentSpec,
        base: &BaseEnvironment,
        named: bool,
    ) -> Option<TaskSpec> {
        let bundle = dir
            .join(crate::defaults::OUTPUT_DIR)
            .join(write::STATIC_DIR)
            .join(format!("{}.tar.gz", kind));
        if !bundle.is_file() {
            return None;
        }

        let mut machines = declared.machine_names();
        if machines.is_empty() {
            machines = base.playground.machine_names();
        }
        if machines.is_empty() {
            log::warn!(
                "found {} but no machines to unpack it on, skipping",
                bundle.display()
            );
            return None;
        }

        let name = if named {
            ENVIRONMENT_FILES_TASK.to_string()
        } else {
            String::new()
        };

        Some(TaskSpec {
            name,
            machine: StringList::new(machines),
            init: true,
            user: StringList::single("root"),
            run: download_script(kind, &self.config.static_url),
            ..Default::default()
        })
    }
}

/// Shell script that downloads and unpacks the content bundle of `kind`.
pub fn download_script(kind: ContentKind, static_url: &str) -> String {
    let target = format!("/opt/{}", kind);
    let url = format!(
        "{}/__static__/{}.tar.gz?t=$(date +%s)",
        static_url.trim_end_matches('/'),
        kind
    );
    format!(
        "mkdir -p {target}\nwget --no-cache -O - \"{url}\" | tar -xz -C {target}"
    )
}

/// Body of an environment page: `manifest.md`, else `README.md`, else empty.
fn read_markdown(dir: &Path) -> Result<String> {
    for candidate in ["manifest.md", "README.md"] {
        let path = dir.join(candidate);
        if path.is_file() {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    Ok(String::new())
}

pub(crate) fn directory_name(dir: &Path) -> String {
    dir.canonicalize()
        .ok()
        .as_deref()
        .unwrap_or(dir)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Compile the content unit at `root` into a staged output tree.
pub fn generate(compiler: &Compiler, root: &Path) -> Result<MemoryFS> {
    let kind = manifest::probe_kind(root)?;
    log::info!("compiling {} at {}", kind, root.display());

    let mut output = MemoryFS::new();

    if kind == ContentKind::Playground {
        let environment = compiler.compile_environment(root)?;
        let yaml = serde_yaml::to_string(&environment)?;
        output.add_file_string(manifest::MANIFEST_FILE, &yaml)?;
        output.copy_dir(&root.join("static"), Path::new(write::STATIC_DIR))?;
        return Ok(output);
    }

    render::content::render(compiler, root, &mut output)?;
    Ok(output)
}

/// Compile the content unit at `root` and write it to `output_path`.
///
/// The output directory is prepared (cleared, or checked to be empty) only
/// after compilation succeeded.
pub fn execute_generate(
    compiler: &Compiler,
    root: &Path,
    output_path: &Path,
    clear: bool,
) -> Result<MemoryFS> {
    let staged = generate(compiler, root)?;

    write::prepare_output(output_path, clear)?;
    write::execute(&staged, output_path)?;

    Ok(staged)
}
