//! UpdateDiagram: rewrite a single diagram source file and
//! invalidate its render cache entry.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::diagram::RenderCache;
use crate::error::{LokoError, Result};
use crate::repository::FsRepository;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDiagramRequest {
    /// Qualified ID of the system, container, or component that owns the
    /// diagram (1, 2, or 3 path segments respectively).
    pub target: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateDiagramResponse {
    pub path: PathBuf,
}

pub fn run(
    root: &std::path::Path,
    source_dir: &str,
    req: &UpdateDiagramRequest,
    cache: &RenderCache,
    cancel: &CancelToken,
) -> Result<UpdateDiagramResponse> {
    cancel.check()?;
    if req.source.trim().is_empty() {
        return Err(LokoError::InvalidArgument("diagram source must not be empty".into()));
    }

    let path = diagram_path(root, source_dir, &req.target)?;
    if !path
        .parent()
        .map(|p| p.exists())
        .unwrap_or(false)
    {
        return Err(LokoError::NotFound(req.target.clone()));
    }

    FsRepository::save_diagram_source(&path, &req.source)?;
    cache.invalidate(&path.to_string_lossy());

    Ok(UpdateDiagramResponse { path })
}

fn diagram_path(root: &std::path::Path, source_dir: &str, target: &str) -> Result<PathBuf> {
    let segments: Vec<&str> = target.split('/').filter(|s| !s.is_empty()).collect();
    let base = root.join(source_dir);
    match segments.as_slice() {
        [system] => Ok(base.join(system).join("system.d2")),
        [system, container] => Ok(base.join(system).join(container).join("container.d2")),
        [system, container, component] => Ok(base
            .join(system)
            .join(container)
            .join(component)
            .join(format!("{component}.d2"))),
        _ => Err(LokoError::InvalidArgument(format!("malformed target '{target}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_source() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RenderCache::new();
        let req = UpdateDiagramRequest {
            target: "payments".into(),
            source: "  ".into(),
        };
        let err = run(dir.path(), "src", &req, &cache, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, LokoError::InvalidArgument(_)));
    }

    #[test]
    fn writes_and_invalidates_cache() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src/payments")).unwrap();
        let cache = RenderCache::new();
        cache.insert(
            &dir.path().join("src/payments/system.d2").to_string_lossy(),
            "old",
            "v1",
            crate::diagram::cache::CacheEntry {
                output_path: "dist/payments.svg".into(),
            },
        );
        let req = UpdateDiagramRequest {
            target: "payments".into(),
            source: "a -> b".into(),
        };
        let resp = run(dir.path(), "src", &req, &cache, &CancelToken::new()).unwrap();
        assert!(resp.path.ends_with("system.d2"));
        assert!(std::fs::read_to_string(&resp.path).unwrap().contains("a -> b"));
        assert!(cache.get(&resp.path.to_string_lossy(), "old", "v1").is_none());
    }
}
