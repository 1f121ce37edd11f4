//! Canonical error type for loko-core.
//!
//! Every fallible operation in the authoring runtime returns
//! `Result<T, LokoError>`. Use-cases wrap lower-level errors with context
//! rather than swallowing them.

use std::path::PathBuf;
use thiserror::Error;

/// Canonical error type for all loko operations.
#[derive(Error, Debug)]
pub enum LokoError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed or missing tool-call arguments, distinct from
    /// `InvalidArgument`'s use-case-level validation failures so the
    /// JSON-RPC host can map this to `-32602` instead of `-32000`.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("parse error in {path}{}: {message}", line.map(|l| format!(":{l}")).unwrap_or_default())]
    ParseError {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    #[error("renderer unavailable: {0}")]
    RendererUnavailable(String),

    #[error("renderer failed: {0}")]
    RendererFailed(String),

    #[error("renderer timed out after {0:?}")]
    RendererTimeout(std::time::Duration),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("protocol error: {0}")]
    ProtocolError(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LokoError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::PermissionDenied {
            LokoError::PermissionDenied(path.display().to_string())
        } else if source.kind() == std::io::ErrorKind::NotFound {
            LokoError::NotFound(path.display().to_string())
        } else {
            LokoError::IoError { path, source }
        }
    }

    pub fn parse(path: impl Into<PathBuf>, line: Option<usize>, message: impl Into<String>) -> Self {
        LokoError::ParseError {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LokoError>;
