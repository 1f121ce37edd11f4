//! Graph construction from a loaded `Project`.
//!
//! Resolution convention for diagram-local node names (decided here and
//! recorded in DESIGN.md): a diagram attached to an entity describes
//! relationships *within that entity's own scope* —
//!   - a system's `system.d2` resolves bare names against the system itself
//!     (its containers are the natural targets),
//!   - a container's `container.d2` resolves bare names against the
//!     container itself (its components),
//!   - a component's own `<id>.d2` resolves bare names against the
//!     component's *parent container*, since components have no children
//!     to nest under and the natural referents are sibling components.

use indexmap::IndexMap;

use crate::diagram::parser;
use crate::entities::{Component, Container, EntityKind, Project, System};
use crate::report::Report;

use super::edge::{Edge, EdgeType};
use super::{ArchitectureGraph, Node};

/// Edges split by provenance, plus the node set and any `tooltip:`
/// attributes found. Kept separate (rather than pre-merged) so drift
/// detection can tell a dangling diagram reference
/// from a dangling front-matter relationship ("OrphanedRelationship")
/// without re-walking the project itself.
#[derive(Debug, Default)]
pub struct RawEdges {
    pub containment: Vec<Edge>,
    pub front_matter: Vec<Edge>,
    pub diagram: Vec<Edge>,
    /// Qualified node ID -> tooltip text, used by drift's
    /// `DescriptionMismatch` check.
    pub tooltips: Vec<(String, String)>,
}

/// Builds the graph for `project`. Deterministic given the same bytes on
/// disk. Diagram parse errors are logged onto `report` as
/// warnings and skipped — they never fail the build.
pub fn build(project: &Project) -> (ArchitectureGraph, Report) {
    let mut graph = ArchitectureGraph::new();
    let (raw, report) = collect(project, &mut graph);

    // Union merge: front-matter label wins on
    // collision, else the diagram's.
    let mut merged: IndexMap<(String, String, EdgeType), Edge> = IndexMap::new();
    for edge in raw.containment.into_iter().chain(raw.front_matter) {
        merged.insert(edge.key(), edge);
    }
    for edge in raw.diagram {
        merged.entry(edge.key()).or_insert(edge);
    }

    graph.set_edges(merged.into_values().collect());
    graph.rebuild_short_ids();
    (graph, report)
}

/// Walks the project once, inserting nodes into `graph` and returning every
/// edge category plus tooltips. Exposed to `usecases::drift` so it can
/// reason about front-matter and diagram edges separately.
pub fn collect(project: &Project, graph: &mut ArchitectureGraph) -> (RawEdges, Report) {
    let mut raw = RawEdges::default();
    let mut report = Report::new();
    for system in project.systems.values() {
        add_system(graph, system, &mut raw, &mut report);
    }
    (raw, report)
}

fn add_system(graph: &mut ArchitectureGraph, system: &System, raw: &mut RawEdges, report: &mut Report) {
    let system_id = system.id.clone();
    graph.add_node(Node {
        id: system_id.clone(),
        kind: EntityKind::System,
        name: system.name.clone(),
        description: system.description.clone(),
        tags: system.tags.clone(),
    });

    for container in system.containers.values() {
        let container_id = format!("{system_id}/{}", container.id);
        raw.containment.push(containment_edge(&system_id, &container_id));
        add_container(graph, &system_id, container, raw, report);
    }

    if let Some(diagram) = &system.diagram {
        collect_diagram(&system_id, diagram, raw, report, &format!("system '{system_id}'"));
    }
}

fn add_container(
    graph: &mut ArchitectureGraph,
    system_id: &str,
    container: &Container,
    raw: &mut RawEdges,
    report: &mut Report,
) {
    let container_id = format!("{system_id}/{}", container.id);
    graph.add_node(Node {
        id: container_id.clone(),
        kind: EntityKind::Container,
        name: container.name.clone(),
        description: container.description.clone(),
        tags: container.tags.clone(),
    });

    for component in container.components.values() {
        let component_id = format!("{container_id}/{}", component.id);
        raw.containment.push(containment_edge(&container_id, &component_id));
        add_component(graph, &container_id, component, raw, report);
    }

    if let Some(diagram) = &container.diagram {
        collect_diagram(&container_id, diagram, raw, report, &format!("container '{container_id}'"));
    }
}

fn add_component(
    graph: &mut ArchitectureGraph,
    container_id: &str,
    component: &Component,
    raw: &mut RawEdges,
    report: &mut Report,
) {
    let component_id = format!("{container_id}/{}", component.id);
    graph.add_node(Node {
        id: component_id.clone(),
        kind: EntityKind::Component,
        name: component.name.clone(),
        description: component.description.clone(),
        tags: component.tags.clone(),
    });

    for rel in &component.relationships {
        // A target containing `/` is already a qualified ID (cross-system
        // or cross-container relationship); otherwise it's a sibling
        // component within this container.
        let target_id = if rel.target.contains('/') {
            rel.target.clone()
        } else {
            format!("{container_id}/{}", rel.target)
        };
        raw.front_matter.push(Edge {
            source: component_id.clone(),
            target: target_id,
            label: rel.label.clone(),
            edge_type: rel.edge_type,
        });
    }

    if let Some(diagram) = &component.diagram {
        // Resolves against the parent container (sibling components), not
        // itself — see module docs.
        collect_diagram(container_id, diagram, raw, report, &format!("component '{component_id}'"));
    }
}

fn collect_diagram(
    scope: &str,
    diagram: &crate::entities::Diagram,
    raw: &mut RawEdges,
    report: &mut Report,
    context: &str,
) {
    match parser::parse(&diagram.source) {
        Ok(parsed) => {
            for e in parsed.edges {
                raw.diagram.push(Edge {
                    source: qualify_under(scope, &e.source),
                    target: qualify_under(scope, &e.target),
                    label: e.label,
                    edge_type: EdgeType::Uses,
                });
            }
            for (path, tooltip) in parsed.tooltips {
                raw.tooltips.push((qualify_under(scope, &path), tooltip));
            }
        }
        Err(err) => report.warn(format!("{context} diagram: {err}")),
    }
}

fn containment_edge(parent: &str, child: &str) -> Edge {
    Edge {
        source: parent.to_string(),
        target: child.to_string(),
        label: String::new(),
        edge_type: EdgeType::Contains,
    }
}

/// Resolves a diagram-local dotted path (e.g. `a` or `nested.a`) against its
/// hosting entity's scope (see module docs for which scope each diagram file
/// uses).
pub(crate) fn qualify_under(scope: &str, dotted: &str) -> String {
    let suffix = dotted.replace('.', "/");
    format!("{scope}/{suffix}")
}
