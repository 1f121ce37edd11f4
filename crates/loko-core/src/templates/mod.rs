//! Template discovery, selection, and substitution.

mod embedded;
mod engine;
mod vars;

pub use embedded::Templates;
pub use engine::{select_component_pack, TemplateEngine};
pub use vars::TemplateVars;
