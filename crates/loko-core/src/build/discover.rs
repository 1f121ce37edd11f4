//! Build stage 1: walk the project repository, producing a list of
//! sources (each entity's `.md` and `.d2` file).

use crate::entities::{EntityKind, Project};

/// One diagram source found while walking the project tree.
#[derive(Debug, Clone)]
pub struct DiscoveredDiagram {
    /// Qualified ID of the entity that owns this diagram.
    pub owner: String,
    pub kind: EntityKind,
    pub source: String,
    /// Path string used as the render cache key, relative to the project
    /// root (stable across machines, unlike an absolute path).
    pub cache_path: String,
}

pub fn discover(project: &Project) -> Vec<DiscoveredDiagram> {
    let mut found = Vec::new();
    let source_dir = &project.config.paths.source;

    for system in project.systems.values() {
        if let Some(diagram) = &system.diagram {
            found.push(DiscoveredDiagram {
                owner: system.id.clone(),
                kind: EntityKind::System,
                source: diagram.source.clone(),
                cache_path: format!("{source_dir}/{}/system.d2", system.id),
            });
        }
        for container in system.containers.values() {
            if let Some(diagram) = &container.diagram {
                found.push(DiscoveredDiagram {
                    owner: format!("{}/{}", system.id, container.id),
                    kind: EntityKind::Container,
                    source: diagram.source.clone(),
                    cache_path: format!("{source_dir}/{}/{}/container.d2", system.id, container.id),
                });
            }
            for component in container.components.values() {
                if let Some(diagram) = &component.diagram {
                    let owner = format!("{}/{}/{}", system.id, container.id, component.id);
                    found.push(DiscoveredDiagram {
                        cache_path: format!(
                            "{source_dir}/{}/{}/{}/{}.d2",
                            system.id, container.id, component.id, component.id
                        ),
                        owner,
                        kind: EntityKind::Component,
                        source: diagram.source.clone(),
                    });
                }
            }
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::entities::{Component, Container, Diagram, FrontMatter, System};
    use std::path::PathBuf;

    #[test]
    fn discovers_diagrams_at_every_level() {
        let mut project = Project::new(PathBuf::from("/tmp/acme"), Config::new("acme"));
        let mut system = System::from_front_matter("payments".into(), FrontMatter::new(), String::new());
        system.diagram = Some(Diagram::new("api {}\n"));
        let mut container = Container::from_front_matter("api".into(), FrontMatter::new(), String::new());
        container.diagram = Some(Diagram::new("charge {}\n"));
        let mut component = Component::from_front_matter("charge".into(), FrontMatter::new(), String::new());
        component.diagram = Some(Diagram::new("charge {}\n"));
        container.components.insert("charge".into(), component);
        system.containers.insert("api".into(), container);
        project.systems.insert("payments".into(), system);

        let found = discover(&project);
        assert_eq!(found.len(), 3);
        assert!(found.iter().any(|d| d.owner == "payments" && d.kind == EntityKind::System));
        assert!(found.iter().any(|d| d.owner == "payments/api" && d.kind == EntityKind::Container));
        assert!(found
            .iter()
            .any(|d| d.owner == "payments/api/charge" && d.kind == EntityKind::Component));
    }
}
