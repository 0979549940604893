//! Manifest Normalization
//!
//! Projects the author-facing manifests onto the publish schema. The resolved
//! environment and the expanded task map replace what the author declared, and
//! the fields a kind does not use are dropped:
//!
//! | Field | Kept for |
//! |---|---|
//! | `playground`, `tasks` | kinds with an environment |
//! | `difficulty` | challenges |
//! | `name`, `slug`, embeds | courses and trainings |
//! | `workingTitle` | trainings |
//!
//! Titles get the uppercased channel prefix unless the channel is the live
//! one or the kind is configured to skip it.

use crate::config::CompilerConfig;
use crate::manifest::publish::{
    ContentEnvironment, PublishedContent, PublishedEnvironment, PublishedEnvironmentSpec, TaskMap,
};
use crate::manifest::{
    AccessControl, Channel, ContentKind, ContentManifest, EnvironmentManifest, EnvironmentSpec,
};

/// The environment of a unit after inheritance, reference resolution and
/// task expansion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedEnvironment {
    pub spec: EnvironmentSpec,
    pub tasks: TaskMap,
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Normalize a content manifest.
///
/// `channel` is the selected channel entry, if the manifest declares channels.
pub fn content(
    manifest: &ContentManifest,
    resolved: Option<ResolvedEnvironment>,
    channel: Option<&Channel>,
    config: &CompilerConfig,
) -> PublishedContent {
    let kind = manifest.kind;
    let catalog = matches!(kind, ContentKind::Course | ContentKind::Training);

    let (playground, tasks) = match resolved {
        Some(resolved) if kind.has_environment() => (
            Some(ContentEnvironment {
                name: resolved.spec.name,
                networks: resolved.spec.networks,
                machines: resolved.spec.machines,
                tabs: resolved.spec.tabs,
            }),
            resolved.tasks,
        ),
        _ => (None, TaskMap::new()),
    };

    let channel_name = channel.and_then(|c| non_empty(&c.name));
    let name = match channel_name {
        Some(name) => Some(name),
        None if catalog => non_empty(&manifest.name),
        None => None,
    };

    PublishedContent {
        kind,
        title: config.title_for(kind, &manifest.title),
        description: manifest.description.clone(),
        categories: manifest.categories.clone(),
        tags: manifest.tags.clone(),
        created_at: manifest.created_at.clone(),
        updated_at: manifest.updated_at.clone(),
        cover: manifest.cover.clone(),
        playground,
        tasks,
        difficulty: if kind == ContentKind::Challenge {
            non_empty(&manifest.difficulty)
        } else {
            None
        },
        slug: if catalog {
            non_empty(&manifest.slug)
        } else {
            None
        },
        name,
        challenges: if catalog {
            manifest.challenges.clone()
        } else {
            Default::default()
        },
        tutorials: if catalog {
            manifest.tutorials.clone()
        } else {
            Default::default()
        },
        courses: if catalog {
            manifest.courses.clone()
        } else {
            Default::default()
        },
        working_title: if kind == ContentKind::Training {
            non_empty(&manifest.working_title)
        } else {
            None
        },
    }
}

/// Normalize an environment-only manifest.
///
/// The channel entry supplies the published name and, when public, opens the
/// environment to anyone.
pub fn environment(
    manifest: &EnvironmentManifest,
    resolved: ResolvedEnvironment,
    channel: &Channel,
    markdown: String,
    config: &CompilerConfig,
) -> PublishedEnvironment {
    let spec = resolved.spec;
    let access_control = if channel.public {
        AccessControl::public()
    } else {
        spec.access_control
    };

    PublishedEnvironment {
        kind: ContentKind::Playground,
        name: non_empty(&channel.name).unwrap_or_else(|| manifest.name.clone()),
        base: manifest.base.clone(),
        title: config.title_for(ContentKind::Playground, &manifest.title),
        description: manifest.description.clone(),
        cover: manifest.cover.clone(),
        categories: manifest.categories.clone(),
        markdown,
        playground: PublishedEnvironmentSpec {
            networks: spec.networks,
            machines: spec.machines,
            tabs: spec.tabs,
            init_tasks: resolved.tasks,
            init_conditions: spec.init_conditions,
            registry_auth: spec.registry_auth,
            access_control,
        },
    }
}
