//! Task Expansion
//!
//! Fans task templates out into concrete task instances, one per
//! (machine, user) pair, and rewrites every `needs` entry to the name of the
//! instance it refers to.
//!
//! ## Naming
//!
//! An instance is named after its template, with the machine appended only
//! when the template targets more than one machine and the user appended only
//! when it targets more than one user. Segments are joined with `_`, and every
//! `-` in the result becomes `_`.
//!
//! ## Process
//!
//! 1.  **Build**: every template is expanded into the instance map. Templates
//!     without machines or users and colliding instance names are rejected.
//!
//! 2.  **Resolve**: every `needs` entry of every instance is resolved, in this
//!     order:
//!     - a template of the same map, which must run on the same machine and,
//!       when it runs as several users, as the same user;
//!     - an instance named `<need>_<machine>_<user>` or `<need>_<machine>`;
//!     - an init task of the base environment named `<need>_<machine>_<user>`,
//!       `<need>_<machine>` or `<need>`.
//!
//!     Anything else is an unknown dependency and fails the whole run.
//!
//! Resolution runs on the fully built map, so error messages can name the
//! exact candidates that were tried.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::manifest::publish::{TaskInstance, TaskMap};
use crate::manifest::TaskSpec;
use crate::suggestions;

/// Whether instances carry their own name in the published map.
///
/// Environment init tasks do, content tasks are identified by key only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceNames {
    Keyed,
    Embedded,
}

/// Join a base name and segments with `_` and make the result identifier-safe.
pub fn task_name(base: &str, segments: &[&str]) -> String {
    let mut name = base.to_string();
    for segment in segments {
        name.push('_');
        name.push_str(segment);
    }
    name.replace('-', "_")
}

/// Name of the instance of `spec` (stored under `key`) for one target pair.
pub fn instance_name(key: &str, spec: &TaskSpec, machine: &str, user: &str) -> String {
    let mut segments = Vec::with_capacity(2);
    if spec.machine.len() > 1 {
        segments.push(machine);
    }
    if spec.user.len() > 1 {
        segments.push(user);
    }
    task_name(spec.base_name(key), &segments)
}

/// Where an instance came from; kept for dependency resolution.
struct Origin<'a> {
    machine: &'a str,
    user: &'a str,
}

/// Expand `templates` into a name-keyed map of task instances.
///
/// `base_tasks` are the init tasks of the base environment; instances may
/// depend on them without owning them.
pub fn expand(
    templates: &BTreeMap<String, TaskSpec>,
    base_tasks: &BTreeMap<String, TaskSpec>,
    names: InstanceNames,
) -> Result<TaskMap> {
    let mut instances = TaskMap::new();
    let mut origins: BTreeMap<String, Origin<'_>> = BTreeMap::new();

    for (key, spec) in templates {
        if spec.machine.is_empty() {
            return Err(Error::EmptyTaskTarget {
                task: key.clone(),
                field: "machines".to_string(),
            });
        }
        if spec.user.is_empty() {
            return Err(Error::EmptyTaskTarget {
                task: key.clone(),
                field: "users".to_string(),
            });
        }

        for machine in &spec.machine {
            for user in &spec.user {
                let name = instance_name(key, spec, machine, user);
                if instances.contains_key(&name) {
                    return Err(Error::DuplicateTask { name });
                }

                let instance = TaskInstance {
                    name: match names {
                        InstanceNames::Embedded => name.clone(),
                        InstanceNames::Keyed => String::new(),
                    },
                    machine: machine.clone(),
                    init: spec.init,
                    user: user.clone(),
                    timeout_seconds: spec.timeout_seconds,
                    needs: spec.needs.clone(),
                    env: spec.env.clone(),
                    run: spec.run.clone(),
                    conditions: spec.conditions.clone(),
                };
                instances.insert(name.clone(), instance);
                origins.insert(name, Origin { machine, user });
            }
        }
    }

    let mut resolved = TaskMap::new();
    for (name, instance) in &instances {
        let Some(origin) = origins.get(name) else {
            continue;
        };
        let needs = instance
            .needs
            .iter()
            .map(|need| resolve_need(need, name, origin, templates, &instances, base_tasks))
            .collect::<Result<Vec<_>>>()?;
        resolved.insert(
            name.clone(),
            TaskInstance {
                needs,
                ..instance.clone()
            },
        );
    }

    log::debug!(
        "expanded {} task templates into {} instances",
        templates.len(),
        resolved.len()
    );

    Ok(resolved)
}

fn resolve_need(
    need: &str,
    task: &str,
    origin: &Origin<'_>,
    templates: &BTreeMap<String, TaskSpec>,
    instances: &TaskMap,
    base_tasks: &BTreeMap<String, TaskSpec>,
) -> Result<String> {
    let task = task.to_string();

    if let Some(dependency) = templates.get(need) {
        if !dependency.machine.contains(origin.machine) {
            return Err(Error::DependencyMachineMismatch {
                task,
                dependency: need.to_string(),
                machine: origin.machine.to_string(),
                user: origin.user.to_string(),
            });
        }
        if dependency.user.len() > 1 && !dependency.user.contains(origin.user) {
            return Err(Error::DependencyUserMismatch {
                task,
                dependency: need.to_string(),
                machine: origin.machine.to_string(),
                user: origin.user.to_string(),
            });
        }
        return Ok(instance_name(need, dependency, origin.machine, origin.user));
    }

    let qualified = [
        task_name(need, &[origin.machine, origin.user]),
        task_name(need, &[origin.machine]),
    ];

    if let Some(found) = qualified.iter().find(|c| instances.contains_key(c.as_str())) {
        return Ok(found.clone());
    }

    if let Some(found) = qualified
        .iter()
        .find(|c| base_tasks.contains_key(c.as_str()))
    {
        return Ok(found.clone());
    }

    if base_tasks.contains_key(need) {
        return Ok(need.to_string());
    }

    let known: Vec<&str> = templates
        .keys()
        .chain(instances.keys())
        .chain(base_tasks.keys())
        .map(String::as_str)
        .collect();

    Err(Error::UnknownDependency {
        task,
        dependency: need.to_string(),
        machine: origin.machine.to_string(),
        user: origin.user.to_string(),
        hint: suggestions::did_you_mean(need, &known),
    })
}
