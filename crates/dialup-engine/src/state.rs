//! Typed access to the persisted state keys.
//!
//! [`StateStore`] is a thin, cloneable handle over the shared
//! [`KeyValueStore`]. Each method is one or two store round-trips; none
//! of them are atomic across keys.

use std::collections::BTreeMap;
use std::sync::Arc;

use dialup_store::{KeyValueStore, keys, single};
use dialup_types::clock::Timestamp;
use dialup_types::error::Result;
use dialup_types::settings::Settings;
use dialup_types::tab::TabId;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

/// Map of matched allowlist domain to last connection time.
pub type ConnectionTimes = BTreeMap<String, Timestamp>;

/// The destination a tab will be sent to once its splash completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingNavigation {
    pub url: String,
    /// When the splash was triggered.
    pub timestamp: Timestamp,
}

#[derive(Clone)]
pub struct StateStore {
    store: Arc<dyn KeyValueStore>,
}

impl StateStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut found = self.store.get(&[key]).await?;
        match found.remove(key) {
            Some(serde_json::Value::Null) | None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.store
            .set(single(key, serde_json::to_value(value)?))
            .await
    }

    // -- settings ---------------------------------------------------------

    /// Current settings, or `None` if never initialised.
    pub async fn settings(&self) -> Result<Option<Settings>> {
        self.read(keys::SETTINGS).await
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.write(keys::SETTINGS, settings).await
    }

    /// Write default settings if none exist. Returns `true` when it did.
    pub async fn ensure_default_settings(&self) -> Result<bool> {
        if self.settings().await?.is_some() {
            return Ok(false);
        }
        self.save_settings(&Settings::default()).await?;
        Ok(true)
    }

    // -- connection times -------------------------------------------------

    pub async fn connection_times(&self) -> Result<ConnectionTimes> {
        Ok(self.read(keys::CONNECTION_TIMES).await?.unwrap_or_default())
    }

    pub async fn connection_time(&self, domain: &str) -> Result<Option<Timestamp>> {
        Ok(self.connection_times().await?.get(domain).copied())
    }

    /// Record `at` as the last connection time for `domain`.
    pub async fn set_connection_time(&self, domain: &str, at: Timestamp) -> Result<()> {
        let mut times = self.connection_times().await?;
        times.insert(domain.to_string(), at);
        self.write(keys::CONNECTION_TIMES, &times).await
    }

    // -- bypass markers ---------------------------------------------------

    pub async fn bypass_marker(&self, domain: &str) -> Result<Option<Timestamp>> {
        self.read(&keys::bypass_key(domain)).await
    }

    pub async fn set_bypass_marker(&self, domain: &str, at: Timestamp) -> Result<()> {
        self.write(&keys::bypass_key(domain), &at).await
    }

    pub async fn remove_bypass_marker(&self, domain: &str) -> Result<()> {
        self.store.remove(&[&keys::bypass_key(domain)]).await
    }

    // -- pending navigations ----------------------------------------------

    pub async fn pending(&self, tab: TabId) -> Result<Option<PendingNavigation>> {
        self.read(&keys::pending_key(tab)).await
    }

    pub async fn set_pending(&self, tab: TabId, pending: &PendingNavigation) -> Result<()> {
        self.write(&keys::pending_key(tab), pending).await
    }

    pub async fn remove_pending(&self, tabs: &[TabId]) -> Result<()> {
        let owned: Vec<String> = tabs.iter().map(|t| keys::pending_key(*t)).collect();
        let refs: Vec<&str> = owned.iter().map(String::as_str).collect();
        self.store.remove(&refs).await
    }

    /// Every stored pending navigation. Entries that do not decode are
    /// skipped with a warning.
    pub async fn all_pending(&self) -> Result<Vec<(TabId, PendingNavigation)>> {
        let all = self.store.get_all().await?;
        let mut out = Vec::new();
        for (key, value) in all {
            let Some(tab) = keys::parse_pending_key(&key) else {
                continue;
            };
            match serde_json::from_value::<PendingNavigation>(value) {
                Ok(pending) => out.push((tab, pending)),
                Err(e) => log::warn!("Skipping malformed pending entry {key}: {e}"),
            }
        }
        Ok(out)
    }
}
