//! Authoring runtime for the loko C4 architecture documentation toolchain.
//!
//! This crate holds the core authoring runtime:
//! the entity model, the architecture graph, the project repository, the
//! diagram parser and renderer port, the template engine, the use-case
//! layer, the incremental build pipeline, the file-system watcher, the
//! query projection/encoding, and the JSON-RPC tool host. Everything here
//! is blocking, synchronous, and testable without a terminal; the `loko`
//! binary in `loko-cli` is the thin adapter that wires it to argv, stdio,
//! and subprocesses.

pub mod build;
pub mod cancel;
pub mod config;
pub mod diagram;
pub mod entities;
pub mod error;
pub mod graph;
pub mod id;
pub mod query;
pub mod report;
pub mod repository;
pub mod rpc;
pub mod templates;
pub mod usecases;
pub mod watcher;
