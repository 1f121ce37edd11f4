//! The JSON-RPC tool host: exposes the use-case layer to LLM
//! clients over line-delimited stdio.

pub mod host;
pub mod protocol;
pub mod tools;

pub use host::ToolHost;
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
