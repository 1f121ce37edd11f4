use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::graph::EdgeType;

use super::{Diagram, Entity, FrontMatter, FrontMatterValue};

/// One relationship declared in a component's front-matter: a target ID, a
/// free-text label, and the edge type it resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub target: String,
    pub label: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technology: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    /// path -> free-text note.
    #[serde(default)]
    pub code_annotations: IndexMap<String, String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram: Option<Diagram>,
    #[serde(skip)]
    pub extra: FrontMatter,
    #[serde(skip)]
    pub body: String,
}

impl Entity for Component {
    fn id(&self) -> &str {
        &self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn description(&self) -> &str {
        &self.description
    }
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

impl Component {
    pub fn from_front_matter(id: String, mut fm: FrontMatter, body: String) -> Self {
        let name = fm
            .take("name")
            .and_then(|v| v.as_scalar().map(str::to_string))
            .unwrap_or_else(|| id.clone());
        let description = fm
            .take("description")
            .and_then(|v| v.as_scalar().map(str::to_string))
            .unwrap_or_default();
        let technology = fm
            .take("technology")
            .and_then(|v| v.as_scalar().map(str::to_string));
        let tags = fm
            .take("tags")
            .and_then(|v| v.as_list().map(|l| l.to_vec()))
            .unwrap_or_default();
        let relationships = fm
            .take("relationships")
            .map(|v| parse_relationships(&v))
            .unwrap_or_default();
        let code_annotations = fm
            .take("code_annotations")
            .and_then(|v| v.as_map().cloned())
            .unwrap_or_default();
        let dependencies = fm
            .take("dependencies")
            .and_then(|v| v.as_list().map(|l| l.to_vec()))
            .unwrap_or_default();

        Component {
            id,
            name,
            description,
            technology,
            tags,
            relationships,
            code_annotations,
            dependencies,
            diagram: None,
            extra: fm,
            body,
        }
    }

    pub fn to_front_matter(&self) -> FrontMatter {
        let mut fm = FrontMatter::new();
        fm.insert("name", FrontMatterValue::Scalar(self.name.clone()));
        if !self.description.is_empty() {
            fm.insert(
                "description",
                FrontMatterValue::Scalar(self.description.clone()),
            );
        }
        if let Some(t) = &self.technology {
            fm.insert("technology", FrontMatterValue::Scalar(t.clone()));
        }
        if !self.tags.is_empty() {
            fm.insert("tags", FrontMatterValue::List(self.tags.clone()));
        }
        if !self.relationships.is_empty() {
            // Round-trip as a flat map when every relationship is `uses`
            // (the common, simplest shape); otherwise group by type keyword.
            if self.relationships.iter().all(|r| r.edge_type == EdgeType::Uses) {
                let mut map = IndexMap::new();
                for r in &self.relationships {
                    map.insert(r.target.clone(), r.label.clone());
                }
                fm.insert("relationships", FrontMatterValue::Map(map));
            } else {
                let mut grouped: IndexMap<String, IndexMap<String, String>> = IndexMap::new();
                for r in &self.relationships {
                    grouped
                        .entry(r.edge_type.as_str().to_string())
                        .or_default()
                        .insert(r.target.clone(), r.label.clone());
                }
                fm.insert("relationships", FrontMatterValue::NestedMap(grouped));
            }
        }
        if !self.code_annotations.is_empty() {
            fm.insert(
                "code_annotations",
                FrontMatterValue::Map(self.code_annotations.clone()),
            );
        }
        if !self.dependencies.is_empty() {
            fm.insert("dependencies", FrontMatterValue::List(self.dependencies.clone()));
        }
        for (k, v) in self.extra.iter() {
            fm.insert(k.clone(), v.clone());
        }
        fm
    }
}

fn parse_relationships(value: &FrontMatterValue) -> Vec<Relationship> {
    match value {
        FrontMatterValue::Map(flat) => flat
            .iter()
            .map(|(target, label)| Relationship {
                target: target.clone(),
                label: label.clone(),
                edge_type: EdgeType::Uses,
            })
            .collect(),
        FrontMatterValue::NestedMap(grouped) => grouped
            .iter()
            .flat_map(|(keyword, targets)| {
                let edge_type = EdgeType::from_keyword(keyword);
                targets.iter().map(move |(target, label)| Relationship {
                    target: target.clone(),
                    label: label.clone(),
                    edge_type,
                })
            })
            .collect(),
        _ => Vec::new(),
    }
}
