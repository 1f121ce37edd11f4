//! Argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "loko")]
#[command(about = "Author and build C4 architecture documentation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to `loko.toml`. Defaults to `<project>/loko.toml`.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Project root. Defaults to the current directory.
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Print per-entity and per-diagram progress, not just the summary.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scaffold a new project in the current (or given) directory.
    Init {
        name: String,
    },

    /// Scaffold a System, Container, or Component.
    New {
        #[command(subcommand)]
        entity: NewEntity,
    },

    /// Render diagrams and emit the documentation site.
    Build {
        /// Comma-separated output formats: html, markdown, pdf.
        #[arg(long, value_delimiter = ',')]
        format: Option<Vec<String>>,

        /// Discard the render cache before building.
        #[arg(long)]
        clean: bool,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Watch the project tree and rebuild on change.
    Watch,

    /// Serve the generated documentation site.
    Serve {
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Run structural validation, optionally including drift detection.
    Validate {
        #[arg(long)]
        check_drift: bool,

        /// Treat warnings as failures.
        #[arg(long)]
        strict: bool,
    },

    /// Run the JSON-RPC tool host over stdio.
    Mcp,

    /// Serve the JSON-RPC tool host over HTTP instead of stdio.
    Api {
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Render every diagram in the project without emitting the doc site.
    Render,

    /// Check that external collaborators (the diagram renderer, the PDF
    /// renderer) are available on `PATH`.
    Doctor,

    /// Print a shell completion script.
    Completion {
        shell: clap_complete::Shell,
    },

    /// Print the binary's version.
    Version,
}

#[derive(Subcommand)]
pub enum NewEntity {
    System(NewArgs),
    Container(NewArgs),
    Component(NewArgs),
}

#[derive(clap::Args)]
pub struct NewArgs {
    pub name: String,

    /// Owning System (for `container`) or `<system>/<container>` (for
    /// `component`).
    #[arg(long)]
    pub parent: Option<String>,

    #[arg(long, default_value = "")]
    pub description: String,

    #[arg(long)]
    pub technology: Option<String>,

    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,

    /// Forces a template pack, bypassing keyword matching.
    #[arg(long)]
    pub template: Option<String>,
}
