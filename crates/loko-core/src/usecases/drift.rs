//! DetectDrift: compares front-matter and diagram-derived
//! relationships against the actual node set, and diagram tooltips against
//! front-matter descriptions.

use serde::{Deserialize, Serialize};

use crate::entities::Project;
use crate::graph::ArchitectureGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftKind {
    DescriptionMismatch,
    MissingComponent,
    OrphanedRelationship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftIssue {
    pub component_id: String,
    pub kind: DriftKind,
    pub severity: Severity,
    pub message: String,
    /// Literal strings involved, so the user can locate the file.
    pub context: Vec<String>,
}

/// Runs every drift check over `project`.
pub fn detect(project: &Project) -> Vec<DriftIssue> {
    let mut graph = ArchitectureGraph::new();
    let (raw, _report) = crate::graph::collect(project, &mut graph);
    let mut issues = Vec::new();

    for edge in &raw.diagram {
        if graph.get_node(&edge.source).is_none() {
            issues.push(DriftIssue {
                component_id: edge.source.clone(),
                kind: DriftKind::MissingComponent,
                severity: Severity::Error,
                message: format!("diagram arrow references unknown component '{}'", edge.source),
                context: vec![edge.source.clone(), edge.target.clone()],
            });
        }
        if graph.get_node(&edge.target).is_none() {
            issues.push(DriftIssue {
                component_id: edge.source.clone(),
                kind: DriftKind::MissingComponent,
                severity: Severity::Error,
                message: format!("diagram arrow references unknown component '{}'", edge.target),
                context: vec![edge.source.clone(), edge.target.clone()],
            });
        }
    }

    for edge in &raw.front_matter {
        if graph.get_node(&edge.target).is_none() {
            issues.push(DriftIssue {
                component_id: edge.source.clone(),
                kind: DriftKind::OrphanedRelationship,
                severity: Severity::Error,
                message: format!("relationship target '{}' does not exist", edge.target),
                context: vec![edge.source.clone(), edge.target.clone()],
            });
        }
    }

    for (node_id, tooltip) in &raw.tooltips {
        if let Some(node) = graph.get_node(node_id) {
            if !node.description.is_empty() && &node.description != tooltip {
                issues.push(DriftIssue {
                    component_id: node_id.clone(),
                    kind: DriftKind::DescriptionMismatch,
                    severity: Severity::Warning,
                    message: format!(
                        "diagram tooltip '{tooltip}' differs from front-matter description '{}'",
                        node.description
                    ),
                    context: vec![node_id.clone(), tooltip.clone(), node.description.clone()],
                });
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::entities::{Component, Container, Diagram, FrontMatter, System};
    use std::path::PathBuf;

    fn base_project() -> Project {
        Project::new(PathBuf::from("/tmp/acme"), Config::new("acme"))
    }

    #[test]
    fn description_mismatch_is_a_warning() {
        let mut project = base_project();
        let mut system = System::from_front_matter("payments".into(), FrontMatter::new(), String::new());
        let mut container = Container::from_front_matter("api".into(), FrontMatter::new(), String::new());
        let mut component = Component::from_front_matter("queue".into(), FrontMatter::new(), String::new());
        component.description = "Standard SQS queue".into();
        container.diagram = Some(Diagram::new("queue {\n  tooltip: \"SQS\"\n}\n"));
        container.components.insert("queue".into(), component);
        system.containers.insert("api".into(), container);
        project.systems.insert("payments".into(), system);

        let issues = detect(&project);
        assert!(issues
            .iter()
            .any(|i| i.kind == DriftKind::DescriptionMismatch && i.severity == Severity::Warning));
    }

    #[test]
    fn missing_component_is_an_error() {
        let mut project = base_project();
        let mut system = System::from_front_matter("payments".into(), FrontMatter::new(), String::new());
        let mut container = Container::from_front_matter("api".into(), FrontMatter::new(), String::new());
        let component = Component::from_front_matter("a".into(), FrontMatter::new(), String::new());
        container.diagram = Some(Diagram::new("a -> ghost: \"x\"\n"));
        container.components.insert("a".into(), component);
        system.containers.insert("api".into(), container);
        project.systems.insert("payments".into(), system);

        let issues = detect(&project);
        assert!(issues
            .iter()
            .any(|i| i.kind == DriftKind::MissingComponent && i.severity == Severity::Error));
    }

    #[test]
    fn orphaned_relationship_is_an_error() {
        let mut project = base_project();
        let mut system = System::from_front_matter("payments".into(), FrontMatter::new(), String::new());
        let mut container = Container::from_front_matter("api".into(), FrontMatter::new(), String::new());
        let mut component = Component::from_front_matter("a".into(), FrontMatter::new(), String::new());
        component.relationships.push(crate::entities::Relationship {
            target: "ghost".into(),
            label: "reads".into(),
            edge_type: crate::graph::EdgeType::Uses,
        });
        container.components.insert("a".into(), component);
        system.containers.insert("api".into(), container);
        project.systems.insert("payments".into(), system);

        let issues = detect(&project);
        assert!(issues
            .iter()
            .any(|i| i.kind == DriftKind::OrphanedRelationship && i.severity == Severity::Error));
    }
}
