//! Interception and connection-state engine.
//!
//! Decides when a top-level navigation to an allowlisted site should be
//! diverted to the dial-up splash, remembers when each site last
//! "connected", and lets the one redirect issued after a splash through
//! without triggering the splash again.
//!
//! All state lives in a [`dialup_store::KeyValueStore`] keyed by the
//! *matched allowlist domain*, so `www.example.com` and `m.example.com`
//! share the connection time of allowlist entry `example.com`.
//!
//! The browser integration drives a [`NavigationInterceptor`]:
//!
//! ```ignore
//! let interceptor = NavigationInterceptor::new(store, clock, &config);
//! interceptor.on_installed().await;
//! let _sweeper = interceptor.pending().spawn_sweeper(config.sweep_interval());
//!
//! match interceptor.on_before_navigate(&event).await {
//!     Action::RedirectTo(url) => browser.load(event.tab_id, &url),
//!     Action::Allow => {},
//! }
//! ```

pub mod config;
pub mod decision;
pub mod interceptor;
pub mod matcher;
pub mod messages;
pub mod pending;
pub mod splash;
pub mod state;
pub mod tracker;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::EngineConfig;
pub use decision::{Decision, DecisionEngine};
pub use interceptor::{Action, NavigationEvent, NavigationInterceptor};
pub use matcher::match_domain;
pub use messages::{Message, Response};
pub use pending::{PendingRegistry, Sweeper};
pub use state::{PendingNavigation, StateStore};
pub use tracker::ConnectionTracker;
