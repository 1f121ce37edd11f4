use serde::{Deserialize, Serialize};

/// Edge classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Uses,
    TriggeredBy,
    Reads,
    Writes,
    Publishes,
    Subscribes,
    Contains,
    Other,
}

impl EdgeType {
    /// Decode a front-matter relationship-group keyword (e.g. the key under
    /// which a nested `relationships:` block groups its targets) into an
    /// `EdgeType`. Unknown keywords fall back to `Other` rather than failing
    /// the load.
    pub fn from_keyword(kw: &str) -> EdgeType {
        match kw {
            "uses" => EdgeType::Uses,
            "triggered_by" => EdgeType::TriggeredBy,
            "reads" => EdgeType::Reads,
            "writes" => EdgeType::Writes,
            "publishes" => EdgeType::Publishes,
            "subscribes" => EdgeType::Subscribes,
            "contains" => EdgeType::Contains,
            _ => EdgeType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Uses => "uses",
            EdgeType::TriggeredBy => "triggered_by",
            EdgeType::Reads => "reads",
            EdgeType::Writes => "writes",
            EdgeType::Publishes => "publishes",
            EdgeType::Subscribes => "subscribes",
            EdgeType::Contains => "contains",
            EdgeType::Other => "other",
        }
    }
}

/// A directed, labeled edge between two qualified node IDs.
///
/// `TriggeredBy` edges are stored with a fixed convention (see DESIGN.md):
/// the declaring node — the one whose front-matter or diagram names the
/// `triggered_by` relationship — is `source`, and the named target is
/// `target`, exactly like every other edge type. No direction flip is
/// applied for this keyword: a component declaring `triggered_by: a` is
/// stored as `component -> a`, even though the English gloss of
/// `triggered_by` reads backwards from that ("component is triggered by a").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub label: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

impl Edge {
    /// Deduplication key used by the union-merge.
    pub fn key(&self) -> (String, String, EdgeType) {
        (self.source.clone(), self.target.clone(), self.edge_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keyword_is_other() {
        assert_eq!(EdgeType::from_keyword("whatever"), EdgeType::Other);
    }

    #[test]
    fn known_keywords_roundtrip_str() {
        for (kw, expected) in [
            ("uses", EdgeType::Uses),
            ("triggered_by", EdgeType::TriggeredBy),
            ("reads", EdgeType::Reads),
            ("writes", EdgeType::Writes),
            ("publishes", EdgeType::Publishes),
            ("subscribes", EdgeType::Subscribes),
            ("contains", EdgeType::Contains),
        ] {
            let decoded = EdgeType::from_keyword(kw);
            assert_eq!(decoded, expected);
            assert_eq!(decoded.as_str(), kw);
        }
    }
}
