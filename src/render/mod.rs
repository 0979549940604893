//! Page rendering
//!
//! Turns a compiled content unit into pages. Templates are organized in
//! [`scope::TemplateScope`]s that nest the same way the content does, so a
//! lesson can override a course-wide template by defining a file with the
//! same name.
//!
//! - [`content`] decides which pages a unit produces
//! - [`layout`] tells flat courses from modular ones
//! - [`data`] loads the `extra` values available to templates
//! - [`functions`] provides the file helpers templates can call
//! - [`front_matter`] assembles index pages

pub mod content;
pub mod data;
pub mod front_matter;
pub mod functions;
pub mod layout;
pub mod scope;

pub use scope::TemplateScope;
