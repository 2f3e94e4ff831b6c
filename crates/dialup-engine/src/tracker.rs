//! Connection state: who connected when, and the post-splash bypass.

use std::sync::Arc;

use dialup_types::clock::Clock;
use dialup_types::error::Result;
use url::Url;

use crate::matcher::match_domain;
use crate::state::StateStore;

/// Records completed connections and arms bypass markers.
#[derive(Clone)]
pub struct ConnectionTracker {
    state: StateStore,
    clock: Arc<dyn Clock>,
}

impl ConnectionTracker {
    pub fn new(state: StateStore, clock: Arc<dyn Clock>) -> Self {
        Self { state, clock }
    }

    /// Stamp the allowlist domain `url` belongs to as connected now.
    ///
    /// Returns the matched domain, or `None` (and writes nothing) when
    /// the host is not on the allowlist or no settings are stored.
    pub async fn mark_connected(&self, url: &str) -> Result<Option<String>> {
        let url = Url::parse(url)?;
        let Some(host) = url.host_str() else {
            return Ok(None);
        };
        let Some(settings) = self.state.settings().await? else {
            return Ok(None);
        };
        let Some(domain) = match_domain(host, &settings.allowlist) else {
            return Ok(None);
        };

        let now = self.clock.now_ms();
        self.state.set_connection_time(domain, now).await?;
        log::debug!("Marked {domain} connected at {now}");
        Ok(Some(domain.to_string()))
    }

    /// Arm the bypass marker for `domain` so the next navigation to it
    /// passes straight through.
    pub async fn set_bypass(&self, domain: &str) -> Result<()> {
        self.state.set_bypass_marker(domain, self.clock.now_ms()).await
    }
}
