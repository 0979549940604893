//! The resolution passes of a compilation run.
//!
//! ## Overview
//!
//! Every unit with an environment goes through the same passes, each of
//! which consumes one representation and produces the next:
//!
//! 1. Inheritance - merge declared machines with the fetched base environment
//! 2. References - read startup file sources and pin image references
//! 3. Expansion - fan task templates out into concrete task instances
//! 4. Normalization - project the manifest onto the publish schema
//!
//! Rendering (see [`crate::render`]) runs after these, and writing the staged
//! output tree is the final step. The [`orchestrator`] wires everything
//! together.
//!
//! Each pass depends only on the passes before it and on the foundation
//! modules (`manifest`, `environments`, `oci`, `cache`).

pub mod expansion;
pub mod inheritance;
pub mod normalize;
pub mod orchestrator;
pub mod references;
pub mod write;

#[cfg(test)]
mod expansion_proptest;

pub use orchestrator::{execute_generate, generate, Compiler};
