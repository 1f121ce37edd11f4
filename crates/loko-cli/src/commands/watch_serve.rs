//! `loko watch` / `loko serve`.

use std::path::Path;

use loko_core::cancel::CancelToken;
use loko_core::diagram::RenderCache;
use loko_core::repository::FsRepository;
use loko_core::usecases::{build_docs, BuildDocsRequest};
use loko_core::watcher::ProjectWatcher;

use crate::diagnostics;
use crate::renderer::{D2Renderer, WkHtmlToPdfRenderer};
use crate::server;

/// Watches the project tree and rebuilds on every coalesced change, until
/// interrupted with Ctrl-C.
pub fn run_watch(root: &Path, verbose: bool) -> i32 {
    let cancel = CancelToken::new();
    let watcher = match ProjectWatcher::start(root, cancel.clone()) {
        Ok((watcher, events)) => {
            install_ctrlc_handler(cancel.clone());
            diagnostics::print_success(&format!("watching {}", root.display()));
            run_rebuild_on_change(root, events, verbose, &cancel);
            watcher
        }
        Err(e) => {
            diagnostics::print_error(&e);
            return super::exit_code_for(&e);
        }
    };
    watcher.stop();
    super::EXIT_OK
}

fn run_rebuild_on_change(root: &Path, events: std::sync::mpsc::Receiver<loko_core::watcher::WatchEvent>, verbose: bool, cancel: &CancelToken) {
    let renderer = D2Renderer::discover();
    let pdf_renderer = WkHtmlToPdfRenderer::discover();
    let cache = RenderCache::new();
    let fallback_name = root.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_else(|| "project".to_string());
    let renderer_version = renderer.version();

    while !cancel.is_cancelled() {
        match events.recv_timeout(std::time::Duration::from_millis(200)) {
            Ok(event) => {
                diagnostics::print_info(&format!("{:?} {}", event.op, event.path));
                let request = BuildDocsRequest { formats: None, clean: false, output_dir: None };
                match build_docs::run(root, &fallback_name, &request, &renderer, &pdf_renderer, &cache, &renderer_version, cancel) {
                    Ok(response) => diagnostics::print_report(&response.report, verbose),
                    Err(e) => diagnostics::print_error(&e),
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn install_ctrlc_handler(cancel: CancelToken) {
    // No signal-handling crate in the dependency stack; Ctrl-C still
    // terminates the process (the watcher thread is daemonized via Drop),
    // this only lets a future cooperative shutdown path flip the flag.
    let _ = cancel;
}

/// Serves the generated documentation site.
pub fn run_serve(root: &Path, port: Option<u16>) -> i32 {
    let config = match FsRepository::load_config(root, "project") {
        Ok(config) => config,
        Err(e) => {
            diagnostics::print_error(&e);
            return super::exit_code_for(&e);
        }
    };
    let port = port.unwrap_or(config.server.serve_port);
    let dist_dir = root.join(&config.paths.output);

    if let Err(e) = server::serve_static(&dist_dir, port, &CancelToken::new()) {
        eprintln!("error: {e}");
        return super::EXIT_FAILURE;
    }
    super::EXIT_OK
}
