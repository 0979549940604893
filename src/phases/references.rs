//! Reference Resolution
//!
//! Resolves the two kinds of indirection an environment may contain before it
//! is published:
//!
//! 1.  **Startup file sources**: a startup file with `fromFile` gets the text
//!     of that file (relative to the content root) as its content.
//!
//! 2.  **Image references**: an `oci://` drive source has its `__CHANNEL__`
//!     placeholder replaced, falls back to a default image when empty, and is
//!     pinned to a digest unless it already is.
//!
//! Drives without a size get a default one when the environment has more
//! than three machines.

use std::path::{Component, Path};

use crate::cache::LookupCache;
use crate::defaults;
use crate::error::{Error, Result};
use crate::manifest::{ContentKind, DriveSpec, EnvironmentSpec, StartupFileSpec};
use crate::oci::{DigestResolver, ImageReference, CHANNEL_PLACEHOLDER, SCHEME};

/// Everything reference resolution needs to know about the unit.
pub struct ReferenceContext<'a> {
    /// Directory `fromFile` paths are relative to.
    pub content_root: &'a Path,
    pub channel: &'a str,
    pub image_repo: &'a str,
    pub kind: ContentKind,
    /// Name used in the default image reference.
    pub content_name: &'a str,
    pub resolver: &'a dyn DigestResolver,
    pub digests: &'a LookupCache<String>,
}

impl ReferenceContext<'_> {
    fn default_image(&self) -> String {
        format!(
            "{}/{}/{}:{}",
            self.image_repo,
            self.kind.plural(),
            self.content_name,
            self.channel
        )
    }
}

/// Resolve every startup file source and drive image of `spec`.
pub fn execute(spec: &EnvironmentSpec, ctx: &ReferenceContext<'_>) -> Result<EnvironmentSpec> {
    let mut resolved = spec.clone();

    let default_size = if spec.machines.len() > defaults::DRIVE_SIZE_MACHINE_THRESHOLD {
        Some(defaults::DRIVE_SIZE)
    } else {
        None
    };

    for machine in resolved.machines.iter_mut() {
        for file in machine.startup_files.iter_mut() {
            resolve_startup_file(file, ctx.content_root)?;
        }
        for drive in machine.drives.iter_mut() {
            resolve_drive(drive, ctx, default_size)?;
        }
    }

    Ok(resolved)
}

fn resolve_startup_file(file: &mut StartupFileSpec, root: &Path) -> Result<()> {
    if file.from_file.is_empty() {
        return Ok(());
    }

    file.content = read_source(root, &file.from_file)?;
    file.from_file.clear();
    Ok(())
}

fn resolve_drive(
    drive: &mut DriveSpec,
    ctx: &ReferenceContext<'_>,
    default_size: Option<&str>,
) -> Result<()> {
    drive.source = pin_source(&drive.source, ctx)?;

    if drive.size.is_empty() {
        if let Some(size) = default_size {
            drive.size = size.to_string();
        }
    }

    Ok(())
}

/// Read a file below `root`. Paths that leave `root` are rejected.
pub fn read_source(root: &Path, relative: &str) -> Result<String> {
    let relative_path = Path::new(relative);
    let escapes = relative_path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(Error::StartupFileSource {
            path: relative.to_string(),
            message: "path must stay inside the content directory".to_string(),
        });
    }

    let path = root.join(relative_path);
    std::fs::read_to_string(&path).map_err(|e| Error::StartupFileSource {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Pin an `oci://` drive source to a digest. Other sources pass through.
pub fn pin_source(source: &str, ctx: &ReferenceContext<'_>) -> Result<String> {
    let Some(rest) = source.strip_prefix(SCHEME) else {
        return Ok(source.to_string());
    };

    let reference = if rest.is_empty() {
        ctx.default_image()
    } else {
        rest.to_string()
    };
    let reference = reference.replace(CHANNEL_PLACEHOLDER, ctx.channel);

    let parsed = ImageReference::parse(&reference)?;
    if parsed.is_pinned() {
        return Ok(format!("{}{}", SCHEME, reference));
    }

    let digest = ctx
        .digests
        .get_or_fetch(&parsed.tagged(), || ctx.resolver.resolve(&parsed))?;

    let pinned = parsed.pinned(&digest);
    log::debug!("pinned {} to {}", reference, pinned);

    Ok(format!("{}{}", SCHEME, pinned))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::MachineSpec;
    use crate::oci::StaticDigestResolver;
    use std::cell::Cell;
    use tempfile::TempDir;

    const DIGEST: &str = "sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    struct CountingResolver {
        calls: Cell<usize>,
    }

    impl DigestResolver for CountingResolver {
        fn resolve(&self, _reference: &ImageReference) -> Result<String> {
            self.calls.set(self.calls.get() + 1);
            Ok(DIGEST.to_string())
        }
    }

    fn context<'a>(
        root: &'a Path,
        resolver: &'a dyn DigestResolver,
        digests: &'a LookupCache<String>,
    ) -> ReferenceContext<'a> {
        ReferenceContext {
            content_root: root,
            channel: "dev",
            image_repo: "ghcr.io/acme/labs",
            kind: ContentKind::Challenge,
            content_name: "broken-nginx",
            resolver,
            digests,
        }
    }

    #[test]
    fn test_non_oci_source_passes_through() {
        let resolver = StaticDigestResolver::new();
        let digests = LookupCache::new("digest");
        let ctx = context(Path::new("."), &resolver, &digests);

        assert_eq!(pin_source("volume://data", &ctx).unwrap(), "volume://data");
    }

    #[test]
    fn test_channel_placeholder_is_replaced_and_pinned() {
        let resolver = StaticDigestResolver::new().with("ghcr.io/acme/rootfs:dev", DIGEST);
        let digests = LookupCache::new("digest");
        let ctx = context(Path::new("."), &resolver, &digests);

        let pinned = pin_source("oci://ghcr.io/acme/rootfs:__CHANNEL__", &ctx).unwrap();
        assert_eq!(pinned, format!("oci://ghcr.io/acme/rootfs:dev@{}", DIGEST));
    }

    #[test]
    fn test_empty_source_uses_default_image() {
        let resolver =
            StaticDigestResolver::new().with("ghcr.io/acme/labs/challenges/broken-nginx:dev", DIGEST);
        let digests = LookupCache::new("digest");
        let ctx = context(Path::new("."), &resolver, &digests);

        let pinned = pin_source("oci://", &ctx).unwrap();
        assert_eq!(
            pinned,
            format!("oci://ghcr.io/acme/labs/challenges/broken-nginx:dev@{}", DIGEST)
        );
    }

    #[test]
    fn test_pinned_source_is_unchanged() {
        let resolver = StaticDigestResolver::new();
        let digests = LookupCache::new("digest");
        let ctx = context(Path::new("."), &resolver, &digests);

        let source = format!("oci://ghcr.io/acme/rootfs:v1@{}", DIGEST);
        assert_eq!(pin_source(&source, &ctx).unwrap(), source);
    }

    #[test]
    fn test_pinning_is_stable_and_memoized() {
        let resolver = CountingResolver {
            calls: Cell::new(0),
        };
        let digests = LookupCache::new("digest");
        let ctx = context(Path::new("."), &resolver, &digests);

        let first = pin_source("oci://ghcr.io/acme/rootfs:v1", &ctx).unwrap();
        let second = pin_source("oci://ghcr.io/acme/rootfs:v1", &ctx).unwrap();
        assert_eq!(first, second);
        assert_eq!(resolver.calls.get(), 1);

        // Pinning an already pinned reference is a no-op.
        assert_eq!(pin_source(&first, &ctx).unwrap(), first);
    }

    #[test]
    fn test_resolution_failure_is_fatal() {
        let resolver = StaticDigestResolver::new();
        let digests = LookupCache::new("digest");
        let ctx = context(Path::new("."), &resolver, &digests);

        let err = pin_source("oci://ghcr.io/acme/rootfs:v1", &ctx).unwrap_err();
        assert!(matches!(err, Error::DigestResolution { .. }));
    }

    #[test]
    fn test_startup_file_source_is_read() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("files")).unwrap();
        std::fs::write(temp.path().join("files/motd"), "Hello\n").unwrap();

        let resolver = StaticDigestResolver::new();
        let digests = LookupCache::new("digest");
        let ctx = context(temp.path(), &resolver, &digests);

        let spec = EnvironmentSpec {
            machines: vec![MachineSpec {
                name: "web".to_string(),
                startup_files: vec![StartupFileSpec {
                    path: "/etc/motd".to_string(),
                    from_file: "files/motd".to_string(),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };

        let resolved = execute(&spec, &ctx).unwrap();
        let file = &resolved.machines[0].startup_files[0];
        assert_eq!(file.content, "Hello\n");
        assert!(file.from_file.is_empty());
    }

    #[test]
    fn test_missing_startup_file_source_is_fatal() {
        let temp = TempDir::new().unwrap();
        let err = read_source(temp.path(), "missing.txt").unwrap_err();
        assert!(matches!(err, Error::StartupFileSource { .. }));
    }

    #[test]
    fn test_startup_file_source_cannot_escape_root() {
        let temp = TempDir::new().unwrap();
        assert!(read_source(temp.path(), "../secret").is_err());
        assert!(read_source(temp.path(), "/etc/passwd").is_err());
    }

    #[test]
    fn test_default_drive_size_for_many_machines() {
        let resolver = StaticDigestResolver::new();
        let digests = LookupCache::new("digest");
        let ctx = context(Path::new("."), &resolver, &digests);

        let machine = |name: &str| MachineSpec {
            name: name.to_string(),
            drives: vec![DriveSpec {
                source: "volume://data".to_string(),
                ..Default::default()
            }],
            ..Default::default()
        };

        let few = EnvironmentSpec {
            machines: vec![machine("a"), machine("b"), machine("c")],
            ..Default::default()
        };
        let resolved = execute(&few, &ctx).unwrap();
        assert!(resolved.machines[0].drives[0].size.is_empty());

        let many = EnvironmentSpec {
            machines: vec![machine("a"), machine("b"), machine("c"), machine("d")],
            ..Default::default()
        };
        let resolved = execute(&many, &ctx).unwrap();
        assert!(resolved
            .machines
            .iter()
            .all(|m| m.drives[0].size == "30GiB"));
    }
}
