//! Projects a loaded `Project` to one of three detail levels.

use serde::{Deserialize, Serialize};

use crate::entities::{Project, Technology};
use crate::error::{LokoError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Project,
    System,
    Container,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detail {
    Summary,
    Structure,
    Full,
}

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub scope: Scope,
    /// Qualified ID the scope narrows to. Required when `scope` isn't
    /// `Project`, and always required for `Detail::Full`.
    pub target: Option<String>,
    pub detail: Detail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryProjection {
    pub systems: usize,
    pub containers: usize,
    pub components: usize,
    pub diagrams: usize,
    pub system_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub technology: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStructure {
    pub id: String,
    pub name: String,
    pub containers: Vec<ContainerSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureProjection {
    pub systems: Vec<SystemStructure>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipView {
    pub target: String,
    pub label: String,
    #[serde(rename = "type")]
    pub edge_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentFull {
    pub id: String,
    pub name: String,
    pub description: String,
    pub technology: Option<String>,
    pub tags: Vec<String>,
    pub relationships: Vec<RelationshipView>,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerFull {
    pub id: String,
    pub name: String,
    pub description: String,
    pub technology: Option<String>,
    pub tags: Vec<String>,
    pub components: Vec<ComponentFull>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemFull {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub technology: Technology,
    pub containers: Vec<ContainerFull>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FullProjection {
    System(SystemFull),
    Container(ContainerFull),
    Component(ComponentFull),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Projection {
    Summary(SummaryProjection),
    Structure(StructureProjection),
    Full(FullProjection),
}

/// Projects `project` per `req`.
pub fn project(project: &Project, req: &QueryRequest) -> Result<Projection> {
    match req.detail {
        Detail::Summary => Ok(Projection::Summary(summary(project))),
        Detail::Structure => structure(project, req).map(Projection::Structure),
        Detail::Full => full(project, req).map(Projection::Full),
    }
}

fn summary(project: &Project) -> SummaryProjection {
    let mut containers = 0;
    let mut components = 0;
    let mut diagrams = 0;
    for system in project.systems.values() {
        diagrams += system.diagram.is_some() as usize;
        containers += system.containers.len();
        for container in system.containers.values() {
            diagrams += container.diagram.is_some() as usize;
            components += container.components.len();
            for component in container.components.values() {
                diagrams += component.diagram.is_some() as usize;
            }
        }
    }
    SummaryProjection {
        systems: project.systems.len(),
        containers,
        components,
        diagrams,
        system_names: project.systems.values().map(|s| s.name.clone()).collect(),
    }
}

/// Resolves the ambiguity of a `Container`-scoped structure query: a
/// container has no sub-structure to show, so only `Project` (every
/// system) and `System` (one system) are accepted here.
fn structure(project: &Project, req: &QueryRequest) -> Result<StructureProjection> {
    let systems: Vec<&crate::entities::System> = match req.scope {
        Scope::Project => project.systems.values().collect(),
        Scope::System => {
            let target = req
                .target
                .as_deref()
                .ok_or_else(|| LokoError::InvalidArgument("structure query at system scope requires a target".into()))?;
            let system = project
                .systems
                .get(target)
                .ok_or_else(|| LokoError::NotFound(target.to_string()))?;
            vec![system]
        }
        Scope::Container => {
            return Err(LokoError::InvalidArgument(
                "structure detail is not defined at container scope".into(),
            ))
        }
    };

    Ok(StructureProjection {
        systems: systems
            .into_iter()
            .map(|system| SystemStructure {
                id: system.id.clone(),
                name: system.name.clone(),
                containers: system
                    .containers
                    .values()
                    .map(|c| ContainerSummary {
                        id: c.id.clone(),
                        name: c.name.clone(),
                        technology: c.technology.clone(),
                    })
                    .collect(),
            })
            .collect(),
    })
}

fn full(project: &Project, req: &QueryRequest) -> Result<FullProjection> {
    let target = req
        .target
        .as_deref()
        .ok_or_else(|| LokoError::InvalidArgument("full detail requires a target".into()))?;
    let segments: Vec<&str> = target.split('/').collect();

    match segments.as_slice() {
        [system_id] => {
            let system = project
                .systems
                .get(*system_id)
                .ok_or_else(|| LokoError::NotFound(target.to_string()))?;
            Ok(FullProjection::System(SystemFull {
                id: system.id.clone(),
                name: system.name.clone(),
                description: system.description.clone(),
                tags: system.tags.clone(),
                technology: system.technology.clone(),
                containers: system.containers.values().map(container_full).collect(),
            }))
        }
        [system_id, container_id] => {
            let system = project
                .systems
                .get(*system_id)
                .ok_or_else(|| LokoError::NotFound(target.to_string()))?;
            let container = system
                .containers
                .get(*container_id)
                .ok_or_else(|| LokoError::NotFound(target.to_string()))?;
            Ok(FullProjection::Container(container_full(container)))
        }
        [system_id, container_id, component_id] => {
            let system = project
                .systems
                .get(*system_id)
                .ok_or_else(|| LokoError::NotFound(target.to_string()))?;
            let container = system
                .containers
                .get(*container_id)
                .ok_or_else(|| LokoError::NotFound(target.to_string()))?;
            let component = container
                .components
                .get(*component_id)
                .ok_or_else(|| LokoError::NotFound(target.to_string()))?;
            Ok(FullProjection::Component(component_full(component)))
        }
        _ => Err(LokoError::InvalidArgument(format!("malformed target '{target}'"))),
    }
}

fn container_full(container: &crate::entities::Container) -> ContainerFull {
    ContainerFull {
        id: container.id.clone(),
        name: container.name.clone(),
        description: container.description.clone(),
        technology: container.technology.clone(),
        tags: container.tags.clone(),
        components: container.components.values().map(component_full).collect(),
    }
}

fn component_full(component: &crate::entities::Component) -> ComponentFull {
    ComponentFull {
        id: component.id.clone(),
        name: component.name.clone(),
        description: component.description.clone(),
        technology: component.technology.clone(),
        tags: component.tags.clone(),
        relationships: component
            .relationships
            .iter()
            .map(|r| RelationshipView {
                target: r.target.clone(),
                label: r.label.clone(),
                edge_type: r.edge_type.as_str().to_string(),
            })
            .collect(),
        dependencies: component.dependencies.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::entities::{Container, System};
    use std::path::PathBuf;

    fn sample_project() -> Project {
        let mut proj = Project::new(PathBuf::from("/tmp/acme"), Config::new("acme"));
        let mut system = System::from_front_matter(
            "payments".into(),
            crate::entities::FrontMatter::new(),
            String::new(),
        );
        system.name = "Payments".into();
        let mut container = Container::from_front_matter(
            "api".into(),
            crate::entities::FrontMatter::new(),
            String::new(),
        );
        container.name = "API".into();
        container.technology = Some("Go + Fiber".into());
        system.containers.insert("api".into(), container);
        proj.systems.insert("payments".into(), system);
        proj
    }

    #[test]
    fn summary_counts_entities() {
        let proj = sample_project();
        let s = summary(&proj);
        assert_eq!(s.systems, 1);
        assert_eq!(s.containers, 1);
        assert_eq!(s.components, 0);
    }

    #[test]
    fn structure_lists_containers_without_components() {
        let proj = sample_project();
        let req = QueryRequest {
            scope: Scope::Project,
            target: None,
            detail: Detail::Structure,
        };
        let Projection::Structure(s) = project(&proj, &req).unwrap() else {
            panic!("expected structure projection");
        };
        assert_eq!(s.systems.len(), 1);
        assert_eq!(s.systems[0].containers[0].technology.as_deref(), Some("Go + Fiber"));
    }

    #[test]
    fn full_requires_target() {
        let proj = sample_project();
        let req = QueryRequest {
            scope: Scope::Project,
            target: None,
            detail: Detail::Full,
        };
        assert!(project(&proj, &req).is_err());
    }
}
