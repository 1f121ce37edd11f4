//! One module per CLI subcommand. Each function
//! takes the parsed arguments plus the resolved project root and returns
//! the process exit code (0 success, 1 runtime failure, 2 configuration
//! error).

mod build;
mod doctor;
mod init;
mod misc;
mod mcp;
mod new;
mod validate;
mod watch_serve;

pub use build::{run_build, run_render};
pub use doctor::run_doctor;
pub use init::run_init;
pub use mcp::{run_api, run_mcp};
pub use misc::{run_completion, run_version};
pub use new::run_new;
pub use validate::run_validate;
pub use watch_serve::{run_serve, run_watch};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Maps a `LokoError` to an exit code.
pub fn exit_code_for(err: &loko_core::error::LokoError) -> i32 {
    use loko_core::error::LokoError;
    match err {
        LokoError::ParseError { .. } if is_config_parse(err) => EXIT_CONFIG_ERROR,
        _ => EXIT_FAILURE,
    }
}

fn is_config_parse(err: &loko_core::error::LokoError) -> bool {
    matches!(err, loko_core::error::LokoError::ParseError { message, .. } if message.contains("invalid config") || message.contains("invalid TOML"))
}
