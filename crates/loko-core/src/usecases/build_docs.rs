//! BuildDocs: loads the project then runs the build
//! pipeline.

use serde::{Deserialize, Serialize};

use crate::build::{self, BuildReport, OutputFormat, PdfRenderer};
use crate::cancel::CancelToken;
use crate::diagram::{DiagramRenderer, RenderCache};
use crate::error::Result;
use crate::report::Report;
use crate::repository::FsRepository;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildDocsRequest {
    #[serde(default)]
    pub formats: Option<Vec<OutputFormat>>,
    #[serde(default)]
    pub clean: bool,
    #[serde(default)]
    pub output_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildDocsResponse {
    pub build: BuildReport,
    pub report: Report,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    root: &std::path::Path,
    fallback_name: &str,
    req: &BuildDocsRequest,
    renderer: &dyn DiagramRenderer,
    pdf_renderer: &dyn PdfRenderer,
    cache: &RenderCache,
    renderer_version: &str,
    cancel: &CancelToken,
) -> Result<BuildDocsResponse> {
    cancel.check()?;
    let (project, load_report) = FsRepository::load_project(root, fallback_name)?;

    let mut request = build::BuildRequest::from_config(&project);
    if let Some(formats) = &req.formats {
        request.formats = formats.clone();
    }
    request.clean = req.clean;
    request.output_dir = req.output_dir.clone();

    let (build_report, mut report) = build::run(&project, renderer, pdf_renderer, cache, renderer_version, &request, cancel)?;
    for w in load_report.warnings {
        report.warn(w);
    }

    Ok(BuildDocsResponse { build: build_report, report })
}
