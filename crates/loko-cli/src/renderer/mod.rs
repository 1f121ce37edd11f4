//! Concrete subprocess adapters for the renderer ports `loko-core` defines:
//! the `d2` diagram renderer and the `wkhtmltopdf` PDF renderer.

pub mod d2;
pub mod pdf;

pub use d2::D2Renderer;
pub use pdf::WkHtmlToPdfRenderer;
