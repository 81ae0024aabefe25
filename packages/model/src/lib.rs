//! # Blocksmith Model
//!
//! The page document model shared by the importer, the compilers and the
//! editor.
//!
//! ```text
//! Project
//!  └─ Section[]            (horizontal slices, N columns each)
//!      └─ Component[]      (typed content nodes, column via props.columnIndex)
//!          └─ Component[]  (children, container types only)
//! ```
//!
//! Everything here is plain owned data: it round-trips through
//! `serde_json` and `Clone` produces fully independent copies, which the
//! history log relies on.

pub mod assets;
pub mod catalog;
pub mod component;
pub mod id_generator;
pub mod project;
pub mod section;
pub mod style;
pub mod tree;
pub mod visitor;

pub use assets::{BlobError, BlobStore, DirectoryBlobStore, MemoryBlobStore};
pub use catalog::{CatalogError, CatalogSource, MockCatalog};
pub use component::{
    CatalogItem, CatalogPayload, Component, ComponentType, Formatting, NavLink, Props,
};
pub use id_generator::{new_id, IdKind};
pub use project::{HistoryEntry, Project};
pub use section::{Section, SectionLayout};
pub use style::StyleMap;
pub use visitor::{Visitor, VisitorMut};
