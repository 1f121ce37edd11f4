//! `loko`: the command-line entry point for C4 architecture documentation.

mod cli;
mod commands;
mod diagnostics;
mod paths;
mod renderer;
mod server;

use std::path::{Path, PathBuf};

use clap::Parser;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("LOKO_VERBOSE", "1");
    }

    let root = resolve_root(&cli.config, &cli.project);
    let code = dispatch(&cli, &root);
    std::process::exit(code);
}

/// Reconciles the `--config`/`--project` persistent flags into the
/// effective project root: an explicit `--config PATH` implies the
/// project root is that file's parent directory, `--project PATH` names
/// the root directly, and absent both we fall back to the current
/// directory.
fn resolve_root(config: &Option<PathBuf>, project: &Option<PathBuf>) -> PathBuf {
    if let Some(config_path) = config {
        return config_path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    }
    if let Some(project) = project {
        return project.clone();
    }
    PathBuf::from(".")
}

fn dispatch(cli: &Cli, root: &Path) -> i32 {
    match &cli.command {
        Commands::Init { name } => commands::run_init(root, name),
        Commands::New { entity } => commands::run_new(root, entity),
        Commands::Build { format, clean, output } => commands::run_build(root, format, *clean, output, cli.verbose),
        Commands::Watch => commands::run_watch(root, cli.verbose),
        Commands::Serve { port } => commands::run_serve(root, *port),
        Commands::Validate { check_drift, strict } => commands::run_validate(root, *check_drift, *strict, cli.verbose),
        Commands::Mcp => commands::run_mcp(root),
        Commands::Api { port } => commands::run_api(port.unwrap_or_else(default_api_port)),
        Commands::Render => commands::run_render(root, cli.verbose),
        Commands::Doctor => commands::run_doctor(),
        Commands::Completion { shell } => commands::run_completion(*shell),
        Commands::Version => commands::run_version(),
    }
}

/// `loko api`'s default port when `--port` is omitted.
/// `LOKO_SERVER_SERVE_PORT` only governs `serve`; `api` has no config-file
/// counterpart, so it falls back to a fixed default instead.
fn default_api_port() -> u16 {
    4000
}
