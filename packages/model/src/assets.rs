//! # Blob Store
//!
//! Binary assets (uploaded images) live outside the page tree and are
//! referenced from components by id. The engine only needs four async
//! operations; a missing blob is always treated as "image absent".

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Invalid blob id: {0}")]
    InvalidId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Blob store unavailable: {0}")]
    Unavailable(String),
}

/// Async key -> binary asset storage
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `id`, returning a URL for them
    async fn put(&self, id: &str, bytes: Vec<u8>, mime: &str) -> Result<String, BlobError>;

    /// URL of a stored blob
    async fn get(&self, id: &str) -> Result<Option<String>, BlobError>;

    /// Blob as a `data:` URI, suitable for embedding in exported HTML
    async fn get_inline(&self, id: &str) -> Result<Option<String>, BlobError>;

    /// Remove a blob. Deleting a missing blob is not an error.
    async fn delete(&self, id: &str) -> Result<(), BlobError>;
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// In-memory blob store. Records every delete call.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, (String, Vec<u8>)>>,
    deleted: Mutex<Vec<String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids passed to `delete`, in call order
    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted.lock().map(|d| d.clone()).unwrap_or_default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blobs
            .lock()
            .map(|b| b.contains_key(id))
            .unwrap_or(false)
    }

    fn lock_error() -> BlobError {
        BlobError::Unavailable("memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, id: &str, bytes: Vec<u8>, mime: &str) -> Result<String, BlobError> {
        let mut blobs = self.blobs.lock().map_err(|_| Self::lock_error())?;
        blobs.insert(id.to_string(), (mime.to_string(), bytes));
        Ok(format!("blob:memory/{}", id))
    }

    async fn get(&self, id: &str) -> Result<Option<String>, BlobError> {
        let blobs = self.blobs.lock().map_err(|_| Self::lock_error())?;
        Ok(blobs.get(id).map(|_| format!("blob:memory/{}", id)))
    }

    async fn get_inline(&self, id: &str) -> Result<Option<String>, BlobError> {
        let blobs = self.blobs.lock().map_err(|_| Self::lock_error())?;
        Ok(blobs.get(id).map(|(mime, bytes)| data_uri(mime, bytes)))
    }

    async fn delete(&self, id: &str) -> Result<(), BlobError> {
        self.deleted
            .lock()
            .map_err(|_| Self::lock_error())?
            .push(id.to_string());
        self.blobs.lock().map_err(|_| Self::lock_error())?.remove(id);
        Ok(())
    }
}

/// Blob store backed by a directory. Each blob is a file named `{id}.{ext}`.
#[derive(Debug, Clone)]
pub struct DirectoryBlobStore {
    root: PathBuf,
}

impl DirectoryBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn locate(&self, id: &str) -> Result<Option<PathBuf>, BlobError> {
        validate_id(id)?;
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.file_stem().and_then(|s| s.to_str()) == Some(id) {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl BlobStore for DirectoryBlobStore {
    async fn put(&self, id: &str, bytes: Vec<u8>, mime: &str) -> Result<String, BlobError> {
        validate_id(id)?;
        tokio::fs::create_dir_all(&self.root).await?;
        if let Some(existing) = self.locate(id).await? {
            tokio::fs::remove_file(existing).await?;
        }
        let path = self.root.join(format!("{}.{}", id, extension_for_mime(mime)));
        tokio::fs::write(&path, bytes).await?;
        debug!(blob_id = %id, path = %path.display(), "Stored blob");
        Ok(path.display().to_string())
    }

    async fn get(&self, id: &str) -> Result<Option<String>, BlobError> {
        Ok(self.locate(id).await?.map(|p| p.display().to_string()))
    }

    async fn get_inline(&self, id: &str) -> Result<Option<String>, BlobError> {
        let Some(path) = self.locate(id).await? else {
            return Ok(None);
        };
        let bytes = tokio::fs::read(&path).await?;
        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .map(mime_for_extension)
            .unwrap_or("application/octet-stream");
        Ok(Some(data_uri(mime, &bytes)))
    }

    async fn delete(&self, id: &str) -> Result<(), BlobError> {
        if let Some(path) = self.locate(id).await? {
            tokio::fs::remove_file(&path).await?;
            debug!(blob_id = %id, "Deleted blob");
        }
        Ok(())
    }
}

fn validate_id(id: &str) -> Result<(), BlobError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(BlobError::InvalidId(id.to_string()))
    }
}

fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "image/png" => "png",
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/avif" => "avif",
        "image/svg+xml" => "svg",
        _ => "bin",
    }
}

fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
