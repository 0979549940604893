//! Environment Inheritance
//!
//! Merges the machines a unit declares with the machines of its base
//! environment. Machines are joined by name; a declared machine without a
//! base counterpart simply inherits nothing.
//!
//! ## Rules
//!
//! - `users` are taken from the base machine when none are declared.
//! - `resources.cpuCount` is taken from the base when it is zero, and
//!   `resources.ramSize` when it is empty.
//! - The base machine's startup files run first, followed by the machine's own.
//! - A declared `hostname` turns into two startup files (`/etc/hostname` and an
//!   `/etc/hosts` entry) that run before everything else.
//! - The environment `welcome` message is given to every default user whose
//!   own welcome is empty or the `-` placeholder.
//!
//! Standalone bases pass no machine fields down. The hostname and welcome
//! rules still apply to them.

use crate::environments::BaseEnvironment;
use crate::manifest::{EnvironmentSpec, MachineSpec, StartupFileSpec};

/// Startup files that set a machine's hostname.
pub fn hostname_files(hostname: &str) -> [StartupFileSpec; 2] {
    [
        StartupFileSpec {
            path: "/etc/hostname".to_string(),
            content: hostname.to_string(),
            mode: "755".to_string(),
            owner: "root:root".to_string(),
            ..Default::default()
        },
        StartupFileSpec {
            path: "/etc/hosts".to_string(),
            content: format!("127.0.0.1       {hostname} {hostname}.local\n"),
            append: true,
            ..Default::default()
        },
    ]
}

/// Merge `spec` with `base`. Returns the fully populated environment; the
/// base is never modified.
pub fn execute(spec: &EnvironmentSpec, base: &BaseEnvironment, standalone: bool) -> EnvironmentSpec {
    let mut merged = spec.clone();

    merged.machines = spec
        .machines
        .iter()
        .map(|machine| {
            let parent = if standalone {
                None
            } else {
                base.machine(&machine.name)
            };
            if parent.is_none() && !standalone {
                log::debug!(
                    "machine '{}' has no counterpart in base '{}'",
                    machine.name,
                    base.name
                );
            }
            merge_machine(machine, parent, &spec.welcome)
        })
        .collect();

    merged
}

fn merge_machine(machine: &MachineSpec, parent: Option<&MachineSpec>, welcome: &str) -> MachineSpec {
    let mut merged = machine.clone();
    let mut startup_files = Vec::new();

    if !machine.hostname.is_empty() {
        startup_files.extend(hostname_files(&machine.hostname));
        merged.hostname.clear();
    }

    if let Some(parent) = parent {
        if merged.users.is_empty() {
            merged.users = parent.users.clone();
        }
        if merged.resources.cpu_count == 0 {
            merged.resources.cpu_count = parent.resources.cpu_count;
        }
        if merged.resources.ram_size.is_empty() {
            merged.resources.ram_size = parent.resources.ram_size.clone();
        }
        startup_files.extend(parent.startup_files.iter().cloned());
    }

    startup_files.append(&mut merged.startup_files);
    merged.startup_files = startup_files;

    if !welcome.is_empty() {
        for user in merged.users.iter_mut() {
            if user.accepts_default_welcome() {
                user.welcome = welcome.to_string();
            }
        }
    }

    merged
}
