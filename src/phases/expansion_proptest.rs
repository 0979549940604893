//! Property-based tests for task expansion.
//!
//! These tests use proptest to generate random task templates and verify that
//! the naming and fan-out invariants hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::manifest::{StringList, TaskSpec};
    use crate::phases::expansion::{expand, instance_name, task_name, InstanceNames};
    use proptest::collection::btree_set;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn spec(machines: Vec<String>, users: Vec<String>) -> TaskSpec {
        TaskSpec {
            machine: StringList::new(machines),
            user: StringList::new(users),
            run: "true".to_string(),
            ..Default::default()
        }
    }

    // ============================================================================
    // task_name property tests
    // ============================================================================

    proptest! {
        /// Property: generated names never contain '-'
        #[test]
        fn task_name_never_contains_dash(
            base in "[a-z][a-z0-9_-]{0,15}",
            machine in "[a-z][a-z0-9-]{0,8}",
            user in "[a-z][a-z0-9-]{0,8}",
        ) {
            let name = task_name(&base, &[&machine, &user]);
            prop_assert!(!name.contains('-'), "name '{}' contains '-'", name);
        }

        /// Property: dash-free names without segments are returned unchanged
        #[test]
        fn task_name_is_identity_for_safe_names(base in "[a-z][a-z0-9_]{0,20}") {
            prop_assert_eq!(task_name(&base, &[]), base);
        }
    }

    // ============================================================================
    // instance_name property tests
    // ============================================================================

    proptest! {
        /// Property: a single-target template keeps its (sanitized) base name
        #[test]
        fn single_target_keeps_base_name(
            base in "[a-z][a-z0-9_-]{0,15}",
            machine in "[a-z]{1,8}",
            user in "[a-z]{1,8}",
        ) {
            let template = spec(vec![machine.clone()], vec![user.clone()]);
            let name = instance_name(&base, &template, &machine, &user);
            prop_assert_eq!(name, base.replace('-', "_"));
        }
    }

    // ============================================================================
    // expand property tests
    // ============================================================================

    proptest! {
        /// Property: expansion yields exactly |machines| x |users| instances
        #[test]
        fn expansion_is_cartesian(
            machines in btree_set("[a-z]{1,6}", 1..4),
            users in btree_set("[a-z]{1,6}", 1..4),
        ) {
            let machines: Vec<String> = machines.into_iter().collect();
            let users: Vec<String> = users.into_iter().collect();
            let mut templates = BTreeMap::new();
            templates.insert("setup".to_string(), spec(machines.clone(), users.clone()));

            let expanded = expand(&templates, &BTreeMap::new(), InstanceNames::Keyed).unwrap();
            prop_assert_eq!(expanded.len(), machines.len() * users.len());

            for machine in &machines {
                for user in &users {
                    prop_assert!(
                        expanded.values().any(|t| &t.machine == machine && &t.user == user),
                        "no instance for ({}, {})",
                        machine,
                        user
                    );
                }
            }
        }

        /// Property: a dependency on a same-shaped template always resolves to
        /// an instance on the same machine
        #[test]
        fn dependencies_stay_on_machine(machines in btree_set("[a-z]{1,6}", 1..4)) {
            let machines: Vec<String> = machines.into_iter().collect();
            let mut templates = BTreeMap::new();
            templates.insert(
                "provision".to_string(),
                spec(machines.clone(), vec!["root".to_string()]),
            );
            let mut setup = spec(machines.clone(), vec!["root".to_string()]);
            setup.needs = vec!["provision".to_string()];
            templates.insert("setup".to_string(), setup);

            let expanded = expand(&templates, &BTreeMap::new(), InstanceNames::Keyed).unwrap();

            for instance in expanded.values().filter(|t| !t.needs.is_empty()) {
                let dependency = &expanded[&instance.needs[0]];
                prop_assert_eq!(&dependency.machine, &instance.machine);
            }
        }

        /// Property: expansion is deterministic
        #[test]
        fn expansion_is_deterministic(
            machines in btree_set("[a-z]{1,6}", 1..4),
            users in btree_set("[a-z]{1,6}", 1..3),
        ) {
            let mut templates = BTreeMap::new();
            templates.insert(
                "setup".to_string(),
                spec(machines.into_iter().collect(), users.into_iter().collect()),
            );

            let first = expand(&templates, &BTreeMap::new(), InstanceNames::Keyed).unwrap();
            let second = expand(&templates, &BTreeMap::new(), InstanceNames::Keyed).unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
