//! `loko init <name>`: scaffolds `loko.toml` and the source tree
//! root. Not a use case in its own right —
//! it's the one-time bootstrap the use-case layer assumes already happened.

use std::path::Path;

use loko_core::config::Config;
use loko_core::error::LokoError;
use loko_core::repository::FsRepository;

use crate::diagnostics;

pub fn run_init(root: &Path, name: &str) -> i32 {
    let config_path = FsRepository::config_path(root);
    if config_path.exists() {
        diagnostics::print_error(&LokoError::AlreadyExists(format!(
            "a project already exists at {}",
            config_path.display()
        )));
        return super::EXIT_FAILURE;
    }

    let config = Config::new(name);
    if let Err(e) = FsRepository::save_config(root, &config) {
        diagnostics::print_error(&e);
        return super::exit_code_for(&e);
    }

    let source_dir = root.join(&config.paths.source);
    if let Err(e) = std::fs::create_dir_all(&source_dir) {
        diagnostics::print_error(&LokoError::io(&source_dir, e));
        return super::EXIT_FAILURE;
    }

    diagnostics::print_success(&format!("initialized '{name}' at {}", root.display()));
    super::EXIT_OK
}
