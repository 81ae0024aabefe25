//! Error types for the editor

use blocksmith_model::{BlobError, CatalogError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Component is not a container: {0}")]
    NotAContainer(String),

    #[error("Cannot move a component into its own subtree")]
    CycleDetected,

    #[error("Index {index} out of range for {len} items")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Component has no catalog payload: {0}")]
    NoCatalogPayload(String),
}

#[derive(Error, Debug)]
pub enum HistoryStorageError {
    #[error("History quota exceeded: {needed} bytes needed, {quota} allowed")]
    QuotaExceeded { needed: usize, quota: usize },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("Blob store error: {0}")]
    Blob(#[from] BlobError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("History storage error: {0}")]
    History(#[from] HistoryStorageError),
}
