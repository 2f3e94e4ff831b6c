//! Navigation boundary: the hooks the browser integration calls.
//!
//! [`NavigationInterceptor::on_before_navigate`] runs for every
//! navigation and answers with an [`Action`]; the caller performs any
//! redirect. [`NavigationInterceptor::on_connection_complete`] runs when
//! a splash finishes. Neither hook returns an error: failures are logged
//! and resolved to [`Action::Allow`].

use std::sync::Arc;

use dialup_store::KeyValueStore;
use dialup_types::clock::Clock;
use dialup_types::error::Result;
use dialup_types::tab::{FrameId, TabId};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::decision::DecisionEngine;
use crate::pending::PendingRegistry;
use crate::splash;
use crate::state::StateStore;
use crate::tracker::ConnectionTracker;

/// A navigation the browser is about to perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    pub tab_id: TabId,
    pub url: String,
    pub frame_id: FrameId,
}

impl NavigationEvent {
    /// A top-level navigation in `tab`.
    pub fn main_frame(tab_id: TabId, url: impl Into<String>) -> Self {
        Self {
            tab_id,
            url: url.into(),
            frame_id: FrameId::MAIN,
        }
    }
}

/// What the browser should do with a tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    /// Leave the tab alone.
    Allow,
    /// Load this URL in the tab.
    RedirectTo(String),
}

pub struct NavigationInterceptor {
    state: StateStore,
    decision: DecisionEngine,
    tracker: ConnectionTracker,
    pending: PendingRegistry,
    splash_url: String,
}

impl NavigationInterceptor {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: &EngineConfig) -> Self {
        let state = StateStore::new(store);
        Self {
            decision: DecisionEngine::new(state.clone(), Arc::clone(&clock), config.bypass_window_ms),
            tracker: ConnectionTracker::new(state.clone(), Arc::clone(&clock)),
            pending: PendingRegistry::new(state.clone(), clock, config.pending_max_age_ms),
            splash_url: config.splash_url.clone(),
            state,
        }
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn decision(&self) -> &DecisionEngine {
        &self.decision
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    pub fn pending(&self) -> &PendingRegistry {
        &self.pending
    }

    /// First-run setup: store default settings if there are none.
    pub async fn on_installed(&self) {
        match self.state.ensure_default_settings().await {
            Ok(true) => log::info!("Installed default settings"),
            Ok(false) => {},
            Err(e) => log::error!("Error initialising settings: {e}"),
        }
    }

    /// Decide what to do with a navigation. Sub-frame navigations are
    /// always allowed.
    pub async fn on_before_navigate(&self, event: &NavigationEvent) -> Action {
        if !event.frame_id.is_main() {
            return Action::Allow;
        }
        if !self.decision.should_intercept(&event.url).await {
            return Action::Allow;
        }

        match self.divert(event).await {
            Ok(target) => {
                log::info!("Intercepted {} in tab {}", event.url, event.tab_id);
                Action::RedirectTo(target)
            },
            Err(e) => {
                log::error!("Error redirecting tab {} to splash: {e}", event.tab_id);
                Action::Allow
            },
        }
    }

    async fn divert(&self, event: &NavigationEvent) -> Result<String> {
        let target = splash::splash_url(&self.splash_url, event.tab_id)?;
        self.pending.register_pending(event.tab_id, &event.url).await?;
        Ok(target)
    }

    /// Finish a splash: record the connection, arm the bypass, drop the
    /// pending entry, then send the tab to `url`.
    ///
    /// On failure the tab stays on the splash page ([`Action::Allow`]).
    pub async fn on_connection_complete(&self, tab: TabId, url: &str) -> Action {
        match self.complete(tab, url).await {
            Ok(()) => {
                log::info!("Connection complete for tab {tab}, continuing to {url}");
                Action::RedirectTo(url.to_string())
            },
            Err(e) => {
                log::error!("Error completing connection for tab {tab}: {e}");
                Action::Allow
            },
        }
    }

    async fn complete(&self, tab: TabId, url: &str) -> Result<()> {
        // Each step is awaited before the next so the redirect cannot
        // race the bypass marker.
        match self.tracker.mark_connected(url).await? {
            Some(domain) => self.tracker.set_bypass(&domain).await?,
            None => log::warn!("{url} is not on the allowlist; continuing without bypass"),
        }
        self.pending.clear_pending(tab).await
    }
}
