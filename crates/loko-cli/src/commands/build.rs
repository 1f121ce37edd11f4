//! `loko build` / `loko render`.

use std::path::{Path, PathBuf};

use loko_core::build::OutputFormat;
use loko_core::cancel::CancelToken;
use loko_core::diagram::RenderCache;
use loko_core::error::LokoError;
use loko_core::usecases::{build_docs, BuildDocsRequest};

use crate::diagnostics;
use crate::renderer::{D2Renderer, WkHtmlToPdfRenderer};

fn parse_format(name: &str) -> Result<OutputFormat, LokoError> {
    match name.trim() {
        "html" => Ok(OutputFormat::Html),
        "markdown" => Ok(OutputFormat::Markdown),
        "pdf" => Ok(OutputFormat::Pdf),
        other => Err(LokoError::InvalidArgument(format!("unknown output format '{other}'"))),
    }
}

pub fn run_build(root: &Path, formats: &Option<Vec<String>>, clean: bool, output: &Option<PathBuf>, verbose: bool) -> i32 {
    let formats = match formats.as_ref().map(|names| names.iter().map(|n| parse_format(n)).collect::<Result<Vec<_>, _>>()) {
        Some(Ok(formats)) => Some(formats),
        Some(Err(e)) => {
            diagnostics::print_error(&e);
            return super::EXIT_CONFIG_ERROR;
        }
        None => None,
    };

    let fallback_name = root.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "project".to_string());
    let request = BuildDocsRequest { formats, clean, output_dir: output.clone() };
    let renderer = D2Renderer::discover();
    let pdf_renderer = WkHtmlToPdfRenderer::discover();
    let cache = RenderCache::new();

    match build_docs::run(root, &fallback_name, &request, &renderer, &pdf_renderer, &cache, &renderer.version(), &CancelToken::new()) {
        Ok(response) => {
            diagnostics::print_report(&response.report, verbose);
            for result in &response.build.format_results {
                if verbose || !result.success {
                    diagnostics::print_info(&format!("{:?}: {}", result.format, result.message.clone().unwrap_or_else(|| "ok".to_string())));
                }
            }
            diagnostics::print_success(&format!(
                "built in {}ms, {} diagram(s) rendered, {} cache hit(s)",
                response.build.duration_ms, response.build.diagrams_rendered, response.build.cache_hits
            ));
            if response.report.has_errors() {
                super::EXIT_FAILURE
            } else {
                super::EXIT_OK
            }
        }
        Err(e) => {
            diagnostics::print_error(&e);
            super::exit_code_for(&e)
        }
    }
}

/// `loko render`: builds only the diagrams, no HTML/markdown/PDF emission.
/// Passing an empty format list still runs the render stage but skips
/// every emit stage.
pub fn run_render(root: &Path, verbose: bool) -> i32 {
    run_build(root, &Some(Vec::new()), false, &None, verbose)
}
