//! Watermark persistence
//!
//! This module defines the storage seam for the sync watermark and a
//! file-backed implementation. The store is behind a trait so tests can swap
//! in an in-memory implementation.

use crate::core::state::watermark::Watermark;
use crate::domain::errors::SyncError;
use crate::domain::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Storage backend for the sync watermark
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the watermark
    ///
    /// Returns `Ok(None)` when no watermark has ever been saved.
    async fn load(&self) -> Result<Option<Watermark>>;

    /// Persist the watermark
    ///
    /// Implementations must make the write atomic: a crash during save must
    /// leave either the previous watermark or the new one, never a torn file.
    async fn save(&self, watermark: &Watermark) -> Result<()>;
}

/// File-backed watermark store
///
/// Stores the watermark as a JSON document. Writes go to a sibling temp file
/// first and are renamed into place, so a crash never corrupts the watermark.
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Create a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    async fn load(&self) -> Result<Option<Watermark>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let watermark = serde_json::from_str(&contents).map_err(|e| {
                    SyncError::State(format!(
                        "watermark file {} is not valid JSON: {}",
                        self.path.display(),
                        e
                    ))
                })?;
                Ok(Some(watermark))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SyncError::State(format!(
                "failed to read watermark file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, watermark: &Watermark) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    SyncError::State(format!(
                        "failed to create state directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let contents = serde_json::to_string_pretty(watermark)?;
        let tmp_path = self.path.with_extension("json.tmp");

        tokio::fs::write(&tmp_path, contents).await.map_err(|e| {
            SyncError::State(format!(
                "failed to write watermark file {}: {}",
                tmp_path.display(),
                e
            ))
        })?;

        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| {
            SyncError::State(format!(
                "failed to replace watermark file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }
}
