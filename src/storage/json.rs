use async_trait::async_trait;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, WatchError};
use crate::models::{ItemId, SeenSet};
use crate::storage::SeenStore;

/// Seen identifiers as a sorted JSON array of strings.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("seen.json"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SeenStore for JsonFileStore {
    async fn load(&self) -> Result<SeenSet> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No state file at {}, starting fresh", self.path.display());
                return Ok(SeenSet::new());
            }
            Err(e) => {
                return Err(WatchError::State(format!("failed to read {}: {}", self.path.display(), e)));
            }
        };

        let ids: Vec<String> = serde_json::from_str(&content).map_err(|e| {
            WatchError::State(format!("{} is not a JSON array of strings: {}", self.path.display(), e))
        })?;

        Ok(ids.into_iter().map(ItemId).collect())
    }

    async fn save(&self, ids: &SeenSet) -> Result<()> {
        // BTreeSet iterates in ascending order
        let sorted: Vec<&str> = ids.iter().map(ItemId::as_str).collect();
        let content = serde_json::to_string_pretty(&sorted)
            .map_err(|e| WatchError::State(format!("failed to serialize state: {}", e)))?;

        let temp = self.temp_path();
        tokio::fs::write(&temp, content)
            .await
            .map_err(|e| WatchError::State(format!("failed to write {}: {}", temp.display(), e)))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| WatchError::State(format!("failed to replace {}: {}", self.path.display(), e)))?;

        info!("Saved {} seen ids to {}", ids.len(), self.path.display());
        Ok(())
    }
}
