use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::{Container, Diagram, Entity, FrontMatter, FrontMatterValue};

/// Technology triple recognized on a System.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Technology {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl Technology {
    pub fn is_empty(&self) -> bool {
        self.language.is_none() && self.framework.is_none() && self.database.is_none()
    }

    fn from_map(map: &IndexMap<String, String>) -> Self {
        Technology {
            language: map.get("language").cloned(),
            framework: map.get("framework").cloned(),
            database: map.get("database").cloned(),
        }
    }

    fn to_map(&self) -> IndexMap<String, String> {
        let mut m = IndexMap::new();
        if let Some(l) = &self.language {
            m.insert("language".to_string(), l.clone());
        }
        if let Some(f) = &self.framework {
            m.insert("framework".to_string(), f.clone());
        }
        if let Some(d) = &self.database {
            m.insert("database".to_string(), d.clone());
        }
        m
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct System {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub technology: Technology,
    #[serde(default)]
    pub key_users: Vec<String>,
    #[serde(default)]
    pub external_systems: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Containers owned by this system, keyed by ID, insertion ordered.
    #[serde(default)]
    pub containers: IndexMap<String, Container>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram: Option<Diagram>,
    /// Unrecognized front-matter keys, preserved verbatim on rewrite.
    #[serde(skip)]
    pub extra: FrontMatter,
    #[serde(skip)]
    pub body: String,
}

impl Entity for System {
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

impl System {
    pub fn from_front_matter(id: String, mut fm: FrontMatter, body: String) -> Self {
        let name = fm
            .take("name")
            .and_then(|v| v.as_scalar().map(str::to_string))
            .unwrap_or_else(|| id.clone());
        let description = fm
            .take("description")
            .and_then(|v| v.as_scalar().map(str::to_string))
            .unwrap_or_default();
        let tags = fm
            .take("tags")
            .and_then(|v| v.as_list().map(|l| l.to_vec()))
            .unwrap_or_default();
        let technology = fm
            .take("technology")
            .and_then(|v| v.as_map().map(Technology::from_map))
            .unwrap_or_default();
        let key_users = fm
            .take("key_users")
            .and_then(|v| v.as_list().map(|l| l.to_vec()))
            .unwrap_or_default();
        let external_systems = fm
            .take("external_systems")
            .and_then(|v| v.as_list().map(|l| l.to_vec()))
            .unwrap_or_default();
        let responsibilities = fm
            .take("responsibilities")
            .and_then(|v| v.as_list().map(|l| l.to_vec()))
            .unwrap_or_default();
        let dependencies = fm
            .take("dependencies")
            .and_then(|v| v.as_list().map(|l| l.to_vec()))
            .unwrap_or_default();

        System {
            id,
            name,
            description,
            tags,
            technology,
            key_users,
            external_systems,
            responsibilities,
            dependencies,
            containers: IndexMap::new(),
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
        if !self.technology.is_empty() {
            fm.insert(
                "technology",
                FrontMatterValue::Map(self.technology.to_map()),
            );
        }
        if !self.tags.is_empty() {
            fm.insert("tags", FrontMatterValue::List(self.tags.clone()));
        }
        if !self.key_users.is_empty() {
            fm.insert(
                "key_users",
                FrontMatterValue::List(self.key_users.clone()),
            );
        }
        if !self.external_systems.is_empty() {
            fm.insert(
                "external_systems",
                FrontMatterValue::List(self.external_systems.clone()),
            );
        }
        if !self.responsibilities.is_empty() {
            fm.insert(
                "responsibilities",
                FrontMatterValue::List(self.responsibilities.clone()),
            );
        }
        if !self.dependencies.is_empty() {
            fm.insert(
                "dependencies",
                FrontMatterValue::List(self.dependencies.clone()),
            );
        }
        for (k, v) in self.extra.iter() {
            fm.insert(k.clone(), v.clone());
        }
        fm
    }
}
