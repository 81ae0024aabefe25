//! # Blocksmith HTML Compiler
//!
//! Turns the section tree into a standalone HTML document. Every component
//! type has exactly one rendering; text and attribute values are always
//! escaped, and the `<style>` block is byte-identical to the CSS export.

pub mod assets;
pub mod compiler;
mod escape;
pub mod export;
pub mod inline;

pub use assets::resolve_images;
pub use compiler::{compile_to_html, CompileOptions};
pub use escape::escape_html;
pub use export::{export, export_with_assets, ExportOutput};
pub use inline::render_inline;
