//! Query projection and encoding.

pub mod encoding;
pub mod projection;

pub use encoding::{encode, Format};
pub use projection::{project, Detail, Projection, QueryRequest, Scope};
