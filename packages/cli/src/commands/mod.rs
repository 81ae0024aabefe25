pub mod apply;
pub mod export;
pub mod import;
pub mod init;

pub use apply::{apply, ApplyArgs};
pub use export::{export, ExportArgs};
pub use import::{import, ImportArgs};
pub use init::{init, InitArgs};

use anyhow::{Context, Result};
use blocksmith_model::{BlobStore, DirectoryBlobStore, MemoryBlobStore, Project};
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;

pub(crate) fn load_project(path: &Path) -> Result<Project> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read project {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid project file {}", path.display()))
}

pub(crate) fn save_project(project: &Project, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(project)?;
    std::fs::write(path, json).with_context(|| format!("Cannot write {}", path.display()))
}

/// Directory store when the config names an assets dir, else an empty one
pub(crate) fn blob_store(config: &Config, cwd: &Path) -> Arc<dyn BlobStore> {
    match config.get_assets_dir(cwd) {
        Some(dir) => Arc::new(DirectoryBlobStore::new(dir)),
        None => Arc::new(MemoryBlobStore::new()),
    }
}
