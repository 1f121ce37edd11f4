//! Subprocess adapter shelling out to `wkhtmltopdf`, the external PDF
//! renderer binary. The `PdfRenderer` port this implements lives in
//! `loko-core::build::pdf`.

use std::process::Command;

use loko_core::build::PdfRenderer;
use loko_core::error::{LokoError, Result};

pub struct WkHtmlToPdfRenderer {
    binary: Option<std::path::PathBuf>,
}

impl WkHtmlToPdfRenderer {
    pub fn discover() -> Self {
        WkHtmlToPdfRenderer { binary: which::which("wkhtmltopdf").ok() }
    }
}

impl PdfRenderer for WkHtmlToPdfRenderer {
    fn is_available(&self) -> bool {
        self.binary.is_some()
    }

    fn render(&self, html_dir: &std::path::Path, output: &std::path::Path) -> Result<()> {
        let binary = self
            .binary
            .as_ref()
            .ok_or_else(|| LokoError::RendererUnavailable("wkhtmltopdf binary not found on PATH".to_string()))?;

        let mut pages: Vec<_> = std::fs::read_dir(html_dir)
            .map_err(|e| LokoError::io(html_dir, e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "html"))
            .collect();
        pages.sort();

        if pages.is_empty() {
            return Err(LokoError::RendererFailed("no HTML pages found to render to PDF".to_string()));
        }

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LokoError::io(parent, e))?;
        }

        let status = Command::new(binary)
            .args(&pages)
            .arg(output)
            .status()
            .map_err(|e| LokoError::RendererFailed(e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(LokoError::RendererFailed(format!("wkhtmltopdf exited with {status}")))
        }
    }
}
