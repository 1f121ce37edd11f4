//! `loko mcp` / `loko api`.

use std::io::{BufReader, BufWriter};
use std::path::Path;

use loko_core::cancel::CancelToken;
use loko_core::rpc::ToolHost;
use loko_core::templates::TemplateEngine;

use crate::diagnostics;
use crate::renderer::{D2Renderer, WkHtmlToPdfRenderer};
use crate::server;

fn build_host() -> ToolHost {
    let renderer = D2Renderer::discover();
    let version = renderer.version();
    ToolHost::new(
        Box::new(renderer),
        Box::new(WkHtmlToPdfRenderer::discover()),
        version,
        TemplateEngine::new(crate::paths::template_override_dir()),
    )
}

pub fn run_mcp(_root: &Path) -> i32 {
    let host = build_host();
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut input = BufReader::new(stdin.lock());
    let mut output = BufWriter::new(stdout.lock());

    match host.serve(&mut input, &mut output, &CancelToken::new()) {
        Ok(()) => super::EXIT_OK,
        Err(e) => {
            diagnostics::print_error(&e);
            super::exit_code_for(&e)
        }
    }
}

pub fn run_api(port: u16) -> i32 {
    let host = build_host();
    match server::serve_api(&host, port, &CancelToken::new()) {
        Ok(()) => super::EXIT_OK,
        Err(e) => {
            eprintln!("error: {e}");
            super::EXIT_FAILURE
        }
    }
}
