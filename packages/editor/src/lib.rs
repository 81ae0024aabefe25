//! # Blocksmith Editor
//!
//! Editing engine for Blocksmith projects.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ importer: HTML → Section[]                  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: ProjectStore + mutations            │
//! │  - Apply mutations by id, any nesting depth │
//! │  - Bounded, throttled undo history          │
//! │  - Release blobs of removed content         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ compiler-html: Section[] → HTML + CSS       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blocksmith_editor::{Mutation, ProjectStore};
//!
//! let mut store = ProjectStore::open(project, blobs);
//! store
//!     .apply(Mutation::AddComponent {
//!         section_id,
//!         component: Component::new(ComponentType::Heading).with_content("Hello"),
//!         index: None,
//!     })
//!     .await;
//! store.undo();
//! let output = store.export(&CompileOptions::default()).await;
//! ```

mod catalog;
mod errors;
mod history;
mod mutations;
mod store;

pub use catalog::populate_catalog;
pub use errors::{EditorError, HistoryStorageError, MutationError};
pub use history::{HistoryConfig, HistoryLog, HistoryStorage, MemoryHistoryStorage, RecordOutcome};
pub use mutations::{ComponentPatch, Mutation, MutationEffect, SectionPatch};
pub use store::ProjectStore;
