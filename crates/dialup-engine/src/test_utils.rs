//! Shared test utilities for the engine.
//!
//! Provides a [`Fixture`] wired to an in-memory store and a manual clock,
//! and a [`FailingStore`] whose every operation errors.

use std::sync::Arc;

use async_trait::async_trait;
use dialup_store::{KeyValueStore, MemoryStore, StoreMap};
use dialup_types::clock::ManualClock;
use dialup_types::error::{DialupError, Result};

use crate::config::EngineConfig;
use crate::decision::DecisionEngine;
use crate::interceptor::NavigationInterceptor;
use crate::pending::PendingRegistry;
use crate::state::StateStore;
use crate::tracker::ConnectionTracker;

/// Every engine component over one shared store and clock.
pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
    pub state: StateStore,
    pub decision: DecisionEngine,
    pub tracker: ConnectionTracker,
    pub pending: PendingRegistry,
    pub interceptor: NavigationInterceptor,
}

/// Build a fixture at time `now` with default settings installed.
pub async fn fixture(now: u64) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(now));
    let interceptor = NavigationInterceptor::new(
        Arc::clone(&store) as Arc<dyn KeyValueStore>,
        Arc::clone(&clock) as Arc<dyn dialup_types::clock::Clock>,
        &EngineConfig::default(),
    );
    interceptor.on_installed().await;

    Fixture {
        state: interceptor.state().clone(),
        decision: interceptor.decision().clone(),
        tracker: interceptor.tracker().clone(),
        pending: interceptor.pending().clone(),
        store,
        clock,
        interceptor,
    }
}

/// A store that is always unavailable.
pub struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _keys: &[&str]) -> Result<StoreMap> {
        Err(DialupError::Store("unavailable".into()))
    }

    async fn get_all(&self) -> Result<StoreMap> {
        Err(DialupError::Store("unavailable".into()))
    }

    async fn set(&self, _items: StoreMap) -> Result<()> {
        Err(DialupError::Store("unavailable".into()))
    }

    async fn remove(&self, _keys: &[&str]) -> Result<()> {
        Err(DialupError::Store("unavailable".into()))
    }
}
