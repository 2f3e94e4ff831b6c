//! JSON-file backed store.
//!
//! The whole map is kept in memory and rewritten to disk after every
//! mutation. Writes go to a sibling temp file which is then renamed over
//! the target, so a crash mid-write leaves the previous snapshot intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dialup_types::error::{DialupError, Result};
use tokio::sync::Mutex;

use crate::{KeyValueStore, StoreMap};

/// A [`KeyValueStore`] persisted as a single JSON object on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<StoreMap>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading any existing snapshot.
    ///
    /// A missing file starts an empty store; a file that is not a JSON
    /// object is an error.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.is_empty() => StoreMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                DialupError::Store(format!("corrupt store {}: {e}", path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreMap::new(),
            Err(e) => return Err(e.into()),
        };
        log::debug!(
            "Opened store {} ({} entries)",
            path.display(),
            entries.len()
        );
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &StoreMap) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &data).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, keys: &[&str]) -> Result<StoreMap> {
        let entries = self.entries.lock().await;
        Ok(keys
            .iter()
            .filter_map(|k| entries.get(*k).map(|v| (k.to_string(), v.clone())))
            .collect())
    }

    async fn get_all(&self) -> Result<StoreMap> {
        Ok(self.entries.lock().await.clone())
    }

    async fn set(&self, items: StoreMap) -> Result<()> {
        // Held across the write so snapshots land in mutation order.
        let mut entries = self.entries.lock().await;
        let mut next = entries.clone();
        next.extend(items);
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if !keys.iter().any(|k| entries.contains_key(*k)) {
            return Ok(());
        }
        let mut next = entries.clone();
        for key in keys {
            next.remove(*key);
        }
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }
}
