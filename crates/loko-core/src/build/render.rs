//! Build stage 2: render diagrams through a bounded worker pool, consulting
//! the render cache first.

use std::path::PathBuf;

use rayon::prelude::*;

use crate::cancel::CancelToken;
use crate::diagram::cache::CacheEntry;
use crate::diagram::{DiagramRenderer, RenderCache, RenderRequest};

use super::discover::DiscoveredDiagram;

#[derive(Debug, Clone)]
pub struct RenderedDiagram {
    pub owner: String,
    pub output_path: PathBuf,
    pub cache_hit: bool,
}

#[derive(Debug, Default)]
pub struct RenderOutcome {
    pub rendered: Vec<RenderedDiagram>,
    /// One warning per diagram that failed or was skipped because the
    /// renderer is unavailable. A single diagram failure is non-fatal.
    pub warnings: Vec<String>,
}

/// Renders every discovered diagram, parallelized over `max_workers`
/// threads.
pub fn render_all(
    diagrams: &[DiscoveredDiagram],
    renderer: &dyn DiagramRenderer,
    cache: &RenderCache,
    output_dir: &std::path::Path,
    renderer_version: &str,
    theme: Option<&str>,
    layout: Option<&str>,
    max_workers: usize,
    cancel: &CancelToken,
) -> RenderOutcome {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_workers.max(1))
        .build()
        .expect("failed to build render worker pool");

    let results: Vec<Result<RenderedDiagram, String>> = pool.install(|| {
        diagrams
            .par_iter()
            .map(|d| render_one(d, renderer, cache, output_dir, renderer_version, theme, layout, cancel))
            .collect()
    });

    let mut outcome = RenderOutcome::default();
    for result in results {
        match result {
            Ok(rendered) => outcome.rendered.push(rendered),
            Err(warning) => outcome.warnings.push(warning),
        }
    }
    outcome
}

fn render_one(
    diagram: &DiscoveredDiagram,
    renderer: &dyn DiagramRenderer,
    cache: &RenderCache,
    output_dir: &std::path::Path,
    renderer_version: &str,
    theme: Option<&str>,
    layout: Option<&str>,
    cancel: &CancelToken,
) -> Result<RenderedDiagram, String> {
    if cancel.is_cancelled() {
        return Err(format!("{}: cancelled", diagram.owner));
    }

    let svg_path = output_dir.join("diagrams").join(format!("{}.svg", diagram.owner.replace('/', "_")));

    if let Some(entry) = cache.get(&diagram.cache_path, &diagram.source, renderer_version) {
        return Ok(RenderedDiagram {
            owner: diagram.owner.clone(),
            output_path: entry.output_path,
            cache_hit: true,
        });
    }

    if !renderer.is_available() {
        return Err(format!(
            "{}: diagram renderer unavailable, page will show a placeholder",
            diagram.owner
        ));
    }

    let request = RenderRequest::new(diagram.source.clone())
        .with_theme(theme.map(str::to_string))
        .with_layout(layout.map(str::to_string));

    match renderer.render_to_file(&request, &svg_path) {
        Ok(()) => {
            cache.insert(
                &diagram.cache_path,
                &diagram.source,
                renderer_version,
                CacheEntry {
                    output_path: svg_path.clone(),
                },
            );
            Ok(RenderedDiagram {
                owner: diagram.owner.clone(),
                output_path: svg_path,
                cache_hit: false,
            })
        }
        Err(e) => Err(format!("{}: {e}", diagram.owner)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::renderer::UnavailableRenderer;

    #[test]
    fn unavailable_renderer_produces_a_warning_not_an_error() {
        let diagrams = vec![DiscoveredDiagram {
            owner: "payments".into(),
            kind: crate::entities::EntityKind::System,
            source: "a -> b".into(),
            cache_path: "src/payments/system.d2".into(),
        }];
        let cache = RenderCache::new();
        let dir = tempfile::tempdir().unwrap();
        let outcome = render_all(
            &diagrams,
            &UnavailableRenderer,
            &cache,
            dir.path(),
            "v1",
            None,
            None,
            4,
            &CancelToken::new(),
        );
        assert!(outcome.rendered.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn cache_hit_is_reported() {
        let diagrams = vec![DiscoveredDiagram {
            owner: "payments".into(),
            kind: crate::entities::EntityKind::System,
            source: "a -> b".into(),
            cache_path: "src/payments/system.d2".into(),
        }];
        let cache = RenderCache::new();
        cache.insert(
            "src/payments/system.d2",
            "a -> b",
            "v1",
            CacheEntry {
                output_path: "dist/diagrams/payments.svg".into(),
            },
        );
        let dir = tempfile::tempdir().unwrap();
        let outcome = render_all(
            &diagrams,
            &UnavailableRenderer,
            &cache,
            dir.path(),
            "v1",
            None,
            None,
            4,
            &CancelToken::new(),
        );
        assert_eq!(outcome.rendered.len(), 1);
        assert!(outcome.rendered[0].cache_hit);
    }
}
