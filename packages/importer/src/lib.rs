//! # Blocksmith Importer
//!
//! Best-effort structural inference from third-party HTML.
//!
//! Two entry points:
//! - [`import_components`]: flat component list. Horizontal layouts become
//!   layout containers. No deduplication.
//! - [`import_sections`]: section list. Landmark elements become sections,
//!   the first horizontal layout defines columns and repeated nodes are
//!   deduplicated.
//!
//! Neither entry point fails. Malformed markup is repaired by the HTML parser
//! and anything unrecognized degrades to paragraphs or is dropped.

pub mod classifier;
pub mod dom;
pub mod factory;
pub mod pipeline;
pub mod resolver;
pub mod sections;

pub use classifier::{classify, count_grid_tracks, LayoutInfo};
pub use dom::{Element, HtmlDocument};
pub use pipeline::{
    import_components, import_components_with, MAX_IMPORT_DEPTH, MAX_LAYOUT_COLUMNS,
    MAX_SECTION_DEPTH,
};
pub use resolver::{CascadeResolver, InlineStyleResolver, NoStyleResolver, ResolvedStyle, StyleResolver};
pub use sections::{import_sections, import_sections_with};

#[cfg(test)]
mod tests;
