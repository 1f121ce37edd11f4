use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Component, Diagram, Entity, FrontMatter, FrontMatterValue};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Container {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub technology: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub components: IndexMap<String, Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram: Option<Diagram>,
    #[serde(skip)]
    pub extra: FrontMatter,
    #[serde(skip)]
    pub body: String,
}

impl Entity for Container {
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

impl Container {
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

        Container {
            id,
            name,
            description,
            technology,
            tags,
            components: IndexMap::new(),
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
        for (k, v) in self.extra.iter() {
            fm.insert(k.clone(), v.clone());
        }
        fm
    }
}
