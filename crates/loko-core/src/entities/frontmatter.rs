//! Free-form front-matter value and the ordered map used to carry unknown
//! keys through a load/save round-trip unchanged.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A front-matter value restricted to the subset this format actually
/// needs: a scalar, a flat sequence, or a single-level mapping. Full YAML
/// nesting is out of scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrontMatterValue {
    Scalar(String),
    List(Vec<String>),
    Map(IndexMap<String, String>),
    /// Two-level mapping, used only by `relationships` when grouped under a
    /// type keyword (`uses:`, `triggered_by:`, ...) rather than given as a
    /// flat `target: label` map.
    NestedMap(IndexMap<String, IndexMap<String, String>>),
}

impl FrontMatterValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FrontMatterValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FrontMatterValue::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, String>> {
        match self {
            FrontMatterValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

/// Ordered mapping of front-matter keys to values. Recognized keys are
/// extracted into typed fields by each entity's loader; everything else
/// stays here and is rewritten verbatim by the entity's saver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrontMatter(pub IndexMap<String, FrontMatterValue>);

impl FrontMatter {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&FrontMatterValue> {
        self.0.get(key)
    }

    pub fn take(&mut self, key: &str) -> Option<FrontMatterValue> {
        self.0.shift_remove(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: FrontMatterValue) {
        self.0.insert(key.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FrontMatterValue)> {
        self.0.iter()
    }
}
