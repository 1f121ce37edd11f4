//! The incremental build pipeline: discover, render, emit.

pub mod discover;
pub mod emit;
pub mod pdf;
pub mod render;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelToken;
use crate::diagram::{DiagramRenderer, RenderCache};
use crate::entities::Project;
use crate::error::Result;
use crate::report::Report;

pub use emit::{FormatResult, OutputFormat};
pub use pdf::PdfRenderer;

#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub formats: Vec<OutputFormat>,
    pub clean: bool,
    pub output_dir: Option<std::path::PathBuf>,
}

impl BuildRequest {
    /// Formats default to whatever `[outputs]` in `loko.toml` enables.
    pub fn from_config(project: &Project) -> Self {
        let outputs = &project.config.outputs;
        let mut formats = Vec::new();
        if outputs.html {
            formats.push(OutputFormat::Html);
        }
        if outputs.markdown {
            formats.push(OutputFormat::Markdown);
        }
        if outputs.pdf {
            formats.push(OutputFormat::Pdf);
        }
        BuildRequest { formats, clean: false, output_dir: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    pub duration_ms: u128,
    pub files_generated: usize,
    pub diagrams_rendered: usize,
    pub cache_hits: usize,
    pub format_results: Vec<FormatResult>,
}

/// Runs all three stages. `renderer_version` keys the render
/// cache alongside path and content hash; callers pass the renderer's own
/// version string (e.g. the `d2` binary version) so upgrading the binary
/// invalidates every entry automatically.
pub fn run(
    project: &Project,
    renderer: &dyn DiagramRenderer,
    pdf_renderer: &dyn PdfRenderer,
    cache: &RenderCache,
    renderer_version: &str,
    request: &BuildRequest,
    cancel: &CancelToken,
) -> Result<(BuildReport, Report)> {
    let start = std::time::Instant::now();
    let mut report = Report::new();

    if request.clean {
        cache.clear();
    }
    cancel.check()?;

    let output_dir = request.output_dir.clone().unwrap_or_else(|| project.output_dir());
    let diagrams = discover::discover(project);
    cancel.check()?;

    let render_outcome = render::render_all(
        &diagrams,
        renderer,
        cache,
        &output_dir,
        renderer_version,
        Some(project.config.d2.theme.as_str()),
        Some(project.config.d2.layout.as_str()),
        project.config.build.max_workers,
        cancel,
    );
    for warning in render_outcome.warnings {
        report.warn(warning);
    }
    let diagrams_rendered = render_outcome.rendered.iter().filter(|r| !r.cache_hit).count();
    let cache_hits = render_outcome.rendered.iter().filter(|r| r.cache_hit).count();

    cancel.check()?;
    let emit_outcome = emit::emit(project, &render_outcome.rendered, &request.formats, &output_dir, pdf_renderer)?;
    for result in &emit_outcome.format_results {
        if !result.success {
            report.warn(format!(
                "{:?} output failed: {}",
                result.format,
                result.message.as_deref().unwrap_or("unknown error")
            ));
        }
    }

    let build_report = BuildReport {
        duration_ms: start.elapsed().as_millis(),
        files_generated: emit_outcome.files_generated,
        diagrams_rendered,
        cache_hits,
        format_results: emit_outcome.format_results,
    };

    Ok((build_report, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::diagram::renderer::UnavailableRenderer;
    use crate::entities::{FrontMatter, System};
    use std::path::PathBuf;

    #[test]
    fn build_with_unavailable_renderer_still_succeeds() {
        let mut project = Project::new(PathBuf::from("/tmp/acme"), Config::new("acme"));
        let mut system = System::from_front_matter("payments".into(), FrontMatter::new(), String::new());
        system.name = "Payments".into();
        system.diagram = Some(crate::entities::Diagram::new("api {}\n"));
        project.systems.insert("payments".into(), system);

        let dir = tempfile::tempdir().unwrap();
        let cache = RenderCache::new();
        let request = BuildRequest {
            formats: vec![OutputFormat::Markdown],
            clean: false,
            output_dir: Some(dir.path().to_path_buf()),
        };

        let (build_report, report) = run(
            &project,
            &UnavailableRenderer,
            &pdf::UnavailablePdfRenderer,
            &cache,
            "v1",
            &request,
            &CancelToken::new(),
        )
        .unwrap();

        assert_eq!(build_report.diagrams_rendered, 0);
        assert_eq!(build_report.files_generated, 1);
        assert_eq!(report.warnings.len(), 1);
    }
}
