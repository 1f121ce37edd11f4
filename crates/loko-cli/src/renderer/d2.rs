//! Subprocess adapter shelling out to the external `d2` diagram renderer
//! binary. The `DiagramRenderer` port this implements lives in `loko-core`.

use std::io::Write;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use loko_core::diagram::{DiagramRenderer, RenderRequest};
use loko_core::error::{LokoError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub struct D2Renderer {
    binary: Option<std::path::PathBuf>,
}

impl D2Renderer {
    pub fn discover() -> Self {
        D2Renderer { binary: which::which("d2").ok() }
    }

    /// `d2 --version`'s first line, used to key the render cache so an
    /// upgraded binary invalidates every cached entry.
    pub fn version(&self) -> String {
        let Some(binary) = &self.binary else {
            return "unavailable".to_string();
        };
        Command::new(binary)
            .arg("--version")
            .output()
            .ok()
            .and_then(|out| String::from_utf8(out.stdout).ok())
            .and_then(|s| s.lines().next().map(str::to_string))
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl DiagramRenderer for D2Renderer {
    fn is_available(&self) -> bool {
        self.binary.is_some()
    }

    fn render(&self, request: &RenderRequest) -> Result<Vec<u8>> {
        let binary = self
            .binary
            .as_ref()
            .ok_or_else(|| LokoError::RendererUnavailable("d2 binary not found on PATH".to_string()))?;

        let mut cmd = Command::new(binary);
        cmd.arg("-").arg("-");
        if let Some(theme) = &request.theme {
            cmd.arg("--theme").arg(theme);
        }
        if let Some(layout) = &request.layout {
            cmd.arg("--layout").arg(layout);
        }
        cmd.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| LokoError::RendererFailed(e.to_string()))?;
        child
            .stdin
            .take()
            .expect("piped stdin")
            .write_all(request.source.as_bytes())
            .map_err(|e| LokoError::RendererFailed(e.to_string()))?;

        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait().map_err(|e| LokoError::RendererFailed(e.to_string()))? {
                let output = child.wait_with_output().map_err(|e| LokoError::RendererFailed(e.to_string()))?;
                return if status.success() {
                    Ok(output.stdout)
                } else {
                    Err(LokoError::RendererFailed(String::from_utf8_lossy(&output.stderr).to_string()))
                };
            }
            if start.elapsed() >= request.deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(LokoError::RendererTimeout(request.deadline));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_binary_reports_unavailable() {
        let renderer = D2Renderer { binary: None };
        assert!(!renderer.is_available());
        let err = renderer.render(&RenderRequest::new("a -> b")).unwrap_err();
        assert!(matches!(err, LokoError::RendererUnavailable(_)));
    }
}
