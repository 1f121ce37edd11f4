use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagram {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered_path: Option<std::path::PathBuf>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub layout: Option<String>,
}

impl Diagram {
    pub fn new(source: impl Into<String>) -> Self {
        Diagram {
            source: source.into(),
            rendered_path: None,
            theme: None,
            layout: None,
        }
    }

    /// SHA-256 of the source text, hex-encoded.
    pub fn content_hash(&self) -> String {
        content_hash(&self.source)
    }
}

pub fn content_hash(source: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_sha256_of_source() {
        let d = Diagram::new("a -> b");
        let expected = {
            let mut h = Sha256::new();
            h.update(b"a -> b");
            format!("{:x}", h.finalize())
        };
        assert_eq!(d.content_hash(), expected);
    }

    #[test]
    fn hash_changes_with_source() {
        let a = Diagram::new("a -> b");
        let b = Diagram::new("a -> c");
        assert_ne!(a.content_hash(), b.content_hash());
    }
}
