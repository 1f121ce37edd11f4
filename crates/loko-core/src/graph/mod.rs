//! The architecture graph: a derived, queryable index over a loaded
//! `Project`.
//!
//! Entities never hold back-references to each other; the graph is the only
//! place ownership and relationship edges are represented together, which is
//! what keeps cycles out of the entity model.

pub(crate) mod builder;
mod edge;

pub use builder::build;
pub(crate) use builder::{collect, RawEdges};
pub use edge::{Edge, EdgeType};

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::entities::EntityKind;

/// A polymorphic graph node: every entity exposes this capability set.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: EntityKind,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ArchitectureGraph {
    /// Nodes keyed by qualified ID, insertion ordered for deterministic
    /// iteration.
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
    /// Short ID -> qualified ID, present only when the short ID is unique
    /// across the whole graph.
    short_ids: HashMap<String, String>,
}

impl ArchitectureGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub(crate) fn set_edges(&mut self, edges: Vec<Edge>) {
        self.edges = edges;
    }

    pub(crate) fn rebuild_short_ids(&mut self) {
        let mut counts: HashMap<&str, Vec<&str>> = HashMap::new();
        for id in self.nodes.keys() {
            let short = crate::id::short_id(id);
            counts.entry(short).or_default().push(id.as_str());
        }
        self.short_ids = counts
            .into_iter()
            .filter(|(_, ids)| ids.len() == 1)
            .map(|(short, ids)| (short.to_string(), ids[0].to_string()))
            .collect();
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get_node(&self, qualified_id: &str) -> Option<&Node> {
        self.nodes.get(qualified_id)
    }

    /// Resolves `short_or_qualified` to a qualified ID: it's returned as-is
    /// if it already names a node, otherwise it's looked up as a short ID
    /// (only succeeds if unique).
    pub fn resolve_id(&self, short_or_qualified: &str) -> Option<&str> {
        if self.nodes.contains_key(short_or_qualified) {
            return Some(self.nodes.get_key_value(short_or_qualified).unwrap().0);
        }
        self.short_ids.get(short_or_qualified).map(String::as_str)
    }

    pub fn outgoing_edges(&self, qualified_id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.source == qualified_id).collect()
    }

    pub fn incoming_edges(&self, qualified_id: &str) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.target == qualified_id).collect()
    }

    /// Breadth-first neighbours within `depth` hops, following edges in
    /// either direction.
    pub fn neighbours(&self, qualified_id: &str, depth: usize) -> Vec<&Node> {
        use std::collections::VecDeque;

        let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
        seen.insert(qualified_id.to_string());
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        queue.push_back((qualified_id.to_string(), 0));
        let mut result = Vec::new();

        while let Some((current, dist)) = queue.pop_front() {
            if dist >= depth {
                continue;
            }
            let mut adjacent: Vec<String> = Vec::new();
            for edge in &self.edges {
                if edge.source == current {
                    adjacent.push(edge.target.clone());
                } else if edge.target == current {
                    adjacent.push(edge.source.clone());
                }
            }
            for next in adjacent {
                if seen.insert(next.clone()) {
                    if let Some(node) = self.nodes.get(&next) {
                        result.push(node);
                    }
                    queue.push_back((next, dist + 1));
                }
            }
        }
        result
    }

    /// Number of edges between any descendant of `a` and any descendant of
    /// `b` (inclusive of `a`/`b` themselves).
    pub fn coupling(&self, a: &str, b: &str) -> usize {
        let in_a = |id: &str| id == a || id.starts_with(&format!("{a}/"));
        let in_b = |id: &str| id == b || id.starts_with(&format!("{b}/"));
        self.edges
            .iter()
            .filter(|e| {
                (in_a(&e.source) && in_b(&e.target)) || (in_b(&e.source) && in_a(&e.target))
            })
            .count()
    }

    /// Nodes whose qualified ID has no corresponding entity resolvable on
    /// the *other* end of an edge — used by drift detection's
    /// `MissingComponent`/`OrphanedRelationship` checks.
    pub fn unresolved_edge_targets(&self) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| !self.nodes.contains_key(&e.target) || !self.nodes.contains_key(&e.source))
            .collect()
    }
}
