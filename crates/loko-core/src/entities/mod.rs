//! The C4 entity model.
//!
//! Entities are closed variants (`System`/`Container`/`Component`/`Diagram`);
//! a common capability set (`id`, `name`, `description`, `path`, `tags`) is
//! exposed by each through the `Entity` trait so the graph builder and query
//! projection can treat them polymorphically without a shared base struct.

mod component;
mod container;
mod diagram;
mod frontmatter;
mod project;
mod system;

pub use component::{Component, Relationship};
pub use container::Container;
pub use diagram::{content_hash, Diagram};
pub use frontmatter::{FrontMatter, FrontMatterValue};
pub use project::Project;
pub use system::{System, Technology};

/// Capability set shared by every entity.
pub trait Entity {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn tags(&self) -> &[String];
}

/// Tag distinguishing entities inside the polymorphic graph `Node`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    System,
    Container,
    Component,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::System => "system",
            EntityKind::Container => "container",
            EntityKind::Component => "component",
        }
    }
}
