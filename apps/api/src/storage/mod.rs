//! Artifact store: the only owner of the generated-PDF directory.
//!
//! Writes go to a temp file in the same directory and are renamed into
//! place, so readers never observe a partially rendered document. Concurrent
//! writers of the same name race; the last rename wins.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::intake::filename::{ARTIFACT_EXTENSION, ARTIFACT_PREFIX};
use crate::render::RenderError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("'{0}' is not a valid artifact name")]
    InvalidName(String),

    #[error("artifact '{0}' not found")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Metadata for a stored artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactInfo {
    pub name: String,
    pub size_bytes: u64,
    pub modified_at: DateTime<Utc>,
}

/// True for plain `curriculo_*.pdf` names with no path components.
pub fn is_artifact_name(name: &str) -> bool {
    name.starts_with(ARTIFACT_PREFIX)
        && name.ends_with(ARTIFACT_EXTENSION)
        && !name.contains("..")
        && !name
            .chars()
            .any(|c| c == '/' || c == '\\' || c.is_control())
}

#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    ttl: Duration,
}

impl ArtifactStore {
    /// Opens (and creates if needed) the storage directory.
    pub fn open(root: impl Into<PathBuf>, ttl: Duration) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        info!(root = %root.display(), ttl_secs = ttl.as_secs(), "Artifact store ready");
        Ok(ArtifactStore { root, ttl })
    }

    #[cfg(test)]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        if !is_artifact_name(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }

    /// Renders into a temp file and atomically moves it to `name`.
    ///
    /// If `render` fails, the temp file is discarded and any existing artifact
    /// under `name` is left untouched.
    pub fn write_with<F>(&self, name: &str, render: F) -> Result<ArtifactInfo, StoreError>
    where
        F: FnOnce(&mut dyn Write) -> Result<(), RenderError>,
    {
        let path = self.path_for(name)?;
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            render(&mut writer)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        let file = tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
        let info = artifact_info(name, &file.metadata()?)?;
        debug!(artifact = name, bytes = info.size_bytes, "Artifact written");
        Ok(info)
    }

    /// Reads an artifact. Expired artifacts are removed and reported missing.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self
            .path_for(name)
            .map_err(|_| StoreError::NotFound(name.to_string()))?;

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        if self.is_expired(&metadata, SystemTime::now()) {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(artifact = name, "Failed to remove expired artifact: {e}");
            }
            return Err(StoreError::NotFound(name.to_string()));
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Lists stored artifacts, oldest first.
    #[cfg(test)]
    pub fn list(&self) -> Result<Vec<ArtifactInfo>, StoreError> {
        let mut artifacts = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_artifact_name(&name) {
                continue;
            }
            let metadata = entry.metadata()?;
            if metadata.is_file() {
                artifacts.push(artifact_info(&name, &metadata)?);
            }
        }
        artifacts.sort_by(|a, b| a.modified_at.cmp(&b.modified_at));
        Ok(artifacts)
    }

    /// Deletes every artifact older than the TTL relative to `now`.
    /// Returns how many were removed. Files that are not artifacts (including
    /// in-flight temp files) are never touched.
    pub fn evict_expired(&self, now: SystemTime) -> Result<usize, StoreError> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_artifact_name(&name) {
                continue;
            }
            let metadata = entry.metadata()?;
            if metadata.is_file() && self.is_expired(&metadata, now) {
                match fs::remove_file(entry.path()) {
                    Ok(()) => removed += 1,
                    // Another request may have evicted it first.
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }
        if removed > 0 {
            info!(removed, "Evicted expired artifacts");
        }
        Ok(removed)
    }

    fn is_expired(&self, metadata: &fs::Metadata, now: SystemTime) -> bool {
        metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .map(|age| age > self.ttl)
            .unwrap_or(false)
    }
}

fn artifact_info(name: &str, metadata: &fs::Metadata) -> Result<ArtifactInfo, StoreError> {
    Ok(ArtifactInfo {
        name: name.to_string(),
        size_bytes: metadata.len(),
        modified_at: DateTime::<Utc>::from(metadata.modified()?),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
