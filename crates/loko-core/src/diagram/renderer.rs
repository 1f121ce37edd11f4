//! The renderer port. The concrete implementation that shells out to the
//! external `d2` binary is thin plumbing and lives in `loko-cli`; this
//! trait is the seam the build pipeline and use-cases code program
//! against.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Default render timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub source: String,
    pub theme: Option<String>,
    pub layout: Option<String>,
    pub deadline: Duration,
}

impl RenderRequest {
    pub fn new(source: impl Into<String>) -> Self {
        RenderRequest {
            source: source.into(),
            theme: None,
            layout: None,
            deadline: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_theme(mut self, theme: Option<String>) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_layout(mut self, layout: Option<String>) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Port implemented by whatever renders diagram source to SVG. Must be safe
/// to call concurrently.
pub trait DiagramRenderer: Send + Sync {
    /// False if the underlying binary is missing from the environment.
    fn is_available(&self) -> bool;

    /// Renders `request.source` to SVG bytes, enforcing `request.deadline`
    /// even if the caller didn't set one explicitly.
    fn render(&self, request: &RenderRequest) -> Result<Vec<u8>>;

    fn render_to_file(&self, request: &RenderRequest, path: &Path) -> Result<()> {
        let svg = self.render(request)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| crate::error::LokoError::io(parent, e))?;
        }
        std::fs::write(path, svg).map_err(|e| crate::error::LokoError::io(path, e))
    }

    fn render_to_writer(&self, request: &RenderRequest, writer: &mut dyn Write) -> Result<()> {
        let svg = self.render(request)?;
        writer
            .write_all(&svg)
            .map_err(|e| crate::error::LokoError::io(Path::new("<writer>"), e))
    }
}

/// A renderer that never finds its binary, used when no concrete renderer
/// is wired in (e.g. `loko-core`'s own tests) or when the real one is
/// unavailable on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableRenderer;

impl DiagramRenderer for UnavailableRenderer {
    fn is_available(&self) -> bool {
        false
    }

    fn render(&self, _request: &RenderRequest) -> Result<Vec<u8>> {
        Err(crate::error::LokoError::RendererUnavailable(
            "no diagram renderer configured".to_string(),
        ))
    }
}
