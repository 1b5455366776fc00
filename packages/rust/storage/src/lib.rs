//! JSON document storage for the story record set.
//!
//! The [`JsonFileStore`] keeps every story in one pretty-printed JSON array.
//! Saves replace the whole document atomically (write to a sibling temp file,
//! then rename), so a crash mid-save leaves the previous document intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use storyfeed_shared::{Result, Story, StoryStore, StoryfeedError};

/// Story store backed by a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store reading and writing the document at `path`. Nothing is touched
    /// until the first load or save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the document, distinguishing "absent" from "corrupt".
    async fn read_document(&self) -> Result<Option<Vec<Story>>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoryfeedError::io(&self.path, e)),
        };

        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoryfeedError::PersistedStateCorrupt {
                path: self.path.clone(),
                message: e.to_string(),
            })
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "stories.json".into());
        self.path.with_file_name(format!(".{name}.tmp"))
    }
}

#[async_trait]
impl StoryStore for JsonFileStore {
    async fn load(&self) -> Vec<Story> {
        match self.read_document().await {
            Ok(Some(stories)) => {
                tracing::debug!(path = %self.path.display(), count = stories.len(), "loaded stories");
                stories
            }
            Ok(None) => {
                tracing::debug!(path = %self.path.display(), "no story document yet, starting empty");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable story document, starting empty");
                Vec::new()
            }
        }
    }

    async fn save(&self, stories: &[Story]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoryfeedError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(stories)
            .map_err(|e| StoryfeedError::parse(format!("failed to serialize stories: {e}")))?;

        let temp = self.temp_path();
        if let Err(e) = replace_with(&temp, &self.path, json).await {
            // The target is untouched; only the partial temp file needs cleaning up.
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %temp.display(), error = %cleanup, "failed to remove temp file");
                }
            }
            return Err(e);
        }

        tracing::info!(path = %self.path.display(), count = stories.len(), "saved stories");
        Ok(())
    }
}

/// Write `contents` to `temp`, then rename it over `target`.
async fn replace_with(temp: &Path, target: &Path, contents: String) -> Result<()> {
    tokio::fs::write(temp, contents)
        .await
        .map_err(|e| StoryfeedError::io(temp, e))?;
    tokio::fs::rename(temp, target)
        .await
        .map_err(|e| StoryfeedError::io(target, e))
}
