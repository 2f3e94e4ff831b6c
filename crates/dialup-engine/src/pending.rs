//! Pending navigations: where each splash tab goes once it finishes.
//!
//! Entries are written when a navigation is intercepted and cleared when
//! the splash reports completion. Tabs closed mid-splash leave orphans
//! behind; a background [`Sweeper`] deletes entries older than the
//! configured maximum age.

use std::sync::Arc;
use std::time::Duration;

use dialup_types::clock::Clock;
use dialup_types::error::{DialupError, Result};
use dialup_types::tab::TabId;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::state::{PendingNavigation, StateStore};

#[derive(Clone)]
pub struct PendingRegistry {
    state: StateStore,
    clock: Arc<dyn Clock>,
    max_age_ms: u64,
}

impl PendingRegistry {
    pub fn new(state: StateStore, clock: Arc<dyn Clock>, max_age_ms: u64) -> Self {
        Self {
            state,
            clock,
            max_age_ms,
        }
    }

    /// Remember `url` as the destination of `tab`, replacing any
    /// previous entry for that tab.
    pub async fn register_pending(&self, tab: TabId, url: &str) -> Result<()> {
        let pending = PendingNavigation {
            url: url.to_string(),
            timestamp: self.clock.now_ms(),
        };
        self.state.set_pending(tab, &pending).await
    }

    /// Look up the destination for `tab` without removing it.
    pub async fn consume_pending(&self, tab: TabId) -> Result<Option<PendingNavigation>> {
        self.state.pending(tab).await
    }

    pub async fn clear_pending(&self, tab: TabId) -> Result<()> {
        self.state.remove_pending(&[tab]).await
    }

    /// Delete every entry older than the maximum age. Returns the tabs
    /// whose entries were removed.
    pub async fn sweep(&self) -> Result<Vec<TabId>> {
        let now = self.clock.now_ms();
        let stale: Vec<TabId> = self
            .state
            .all_pending()
            .await?
            .into_iter()
            .filter(|(_, p)| now.saturating_sub(p.timestamp) > self.max_age_ms)
            .map(|(tab, _)| tab)
            .collect();

        if !stale.is_empty() {
            self.state.remove_pending(&stale).await?;
            log::info!("Swept {} orphaned pending navigation(s)", stale.len());
        }
        Ok(stale)
    }

    /// Start sweeping every `period` on the current Tokio runtime.
    ///
    /// The first sweep runs one full period after the call.
    pub fn spawn_sweeper(&self, period: Duration) -> Sweeper {
        let registry = self.clone();
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = registry.sweep().await {
                            log::error!("Pending sweep failed: {e}");
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            log::debug!("Pending sweeper stopped");
        });

        Sweeper { stop_tx, handle }
    }
}

/// Handle to a running background sweep.
pub struct Sweeper {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Stop the sweep loop and wait for it to exit.
    pub async fn shutdown(self) -> Result<()> {
        // Send fails only if the task already exited.
        let _ = self.stop_tx.send(true);
        self.handle
            .await
            .map_err(|e| DialupError::Task(format!("sweeper: {e}")))
    }
}
