//! Interception decision: should this navigation see the splash?
//!
//! Checks run in order and stop at the first conclusive one:
//!
//! 1. the URL parses (otherwise: allow, and log);
//! 2. settings exist and are enabled;
//! 3. the URL is `http(s)` and its hostname matches an allowlist entry;
//! 4. a bypass marker for that entry, if any, is consumed. A fresh one
//!    lets the navigation through; a stale one is discarded and the
//!    check continues;
//! 5. the entry has never connected: intercept;
//! 6. the entry's last connection is at least `timeoutMinutes` old:
//!    intercept.
//!
//! The only state this touches is the bypass marker in step 4.

use std::sync::Arc;

use dialup_types::clock::{Clock, Timestamp};
use dialup_types::error::Result;
use url::Url;

use crate::matcher::match_domain;
use crate::state::StateStore;

/// Outcome of a decision, with the reason it was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// No settings stored yet.
    NoSettings,
    /// The master switch is off.
    Disabled,
    /// Host is not on the allowlist.
    NotAllowlisted,
    /// A fresh bypass marker was consumed.
    Bypassed { domain: String },
    /// The domain has never connected.
    FirstVisit { domain: String },
    /// The domain connected recently.
    Connected { domain: String, elapsed_ms: u64 },
    /// The domain's connection has gone idle.
    TimedOut { domain: String, elapsed_ms: u64 },
}

impl Decision {
    /// Whether the navigation should be diverted to the splash.
    pub fn intercepts(&self) -> bool {
        matches!(self, Self::FirstVisit { .. } | Self::TimedOut { .. })
    }

    /// Matched allowlist domain, when the decision got that far.
    pub fn domain(&self) -> Option<&str> {
        match self {
            Self::Bypassed { domain }
            | Self::FirstVisit { domain }
            | Self::Connected { domain, .. }
            | Self::TimedOut { domain, .. } => Some(domain.as_str()),
            Self::NoSettings | Self::Disabled | Self::NotAllowlisted => None,
        }
    }
}

#[derive(Clone)]
pub struct DecisionEngine {
    state: StateStore,
    clock: Arc<dyn Clock>,
    bypass_window_ms: u64,
}

impl DecisionEngine {
    pub fn new(state: StateStore, clock: Arc<dyn Clock>, bypass_window_ms: u64) -> Self {
        Self {
            state,
            clock,
            bypass_window_ms,
        }
    }

    /// Decide whether `target_url` should be intercepted.
    ///
    /// Never fails: any error is logged and treated as "do not intercept".
    pub async fn should_intercept(&self, target_url: &str) -> bool {
        match self.evaluate(target_url).await {
            Ok(decision) => {
                log::debug!("Decision for {target_url}: {decision:?}");
                decision.intercepts()
            },
            Err(e) => {
                log::error!("Error checking splash requirement for {target_url}: {e}");
                false
            },
        }
    }

    /// Run the decision and report why it came out the way it did.
    pub async fn evaluate(&self, target_url: &str) -> Result<Decision> {
        let url = Url::parse(target_url)?;

        let Some(settings) = self.state.settings().await? else {
            log::warn!("No settings stored; not intercepting");
            return Ok(Decision::NoSettings);
        };
        if !settings.enabled {
            return Ok(Decision::Disabled);
        }

        if !matches!(url.scheme(), "http" | "https") {
            return Ok(Decision::NotAllowlisted);
        }
        let Some(host) = url.host_str() else {
            return Ok(Decision::NotAllowlisted);
        };
        let Some(domain) = match_domain(host, &settings.allowlist) else {
            return Ok(Decision::NotAllowlisted);
        };
        let domain = domain.to_string();

        if let Some(marker) = self.state.bypass_marker(&domain).await? {
            // Single use: consumed whether or not it is still valid.
            self.state.remove_bypass_marker(&domain).await?;
            if self.is_fresh(marker) {
                return Ok(Decision::Bypassed { domain });
            }
            log::debug!("Discarded stale bypass marker for {domain}");
        }

        let Some(last) = self.state.connection_time(&domain).await? else {
            return Ok(Decision::FirstVisit { domain });
        };

        let elapsed_ms = self.clock.now_ms().saturating_sub(last);
        if elapsed_ms >= settings.timeout_ms() {
            Ok(Decision::TimedOut { domain, elapsed_ms })
        } else {
            Ok(Decision::Connected { domain, elapsed_ms })
        }
    }

    fn is_fresh(&self, marker: Timestamp) -> bool {
        self.clock.now_ms().saturating_sub(marker) < self.bypass_window_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BYPASS_WINDOW_MS;
    use crate::test_utils::{FailingStore, fixture};
    use dialup_store::KeyValueStore;
    use dialup_types::settings::Settings;

    const T0: u64 = 1_700_000_000_000;
    const TEN_MIN: u64 = 10 * 60_000;

    #[tokio::test]
    async fn first_visit_intercepts() {
        let fx = fixture(T0).await;
        let d = fx.decision.evaluate("https://www.reddit.com/r/test").await.unwrap();
        assert_eq!(d, Decision::FirstVisit { domain: "reddit.com".into() });
        assert!(d.intercepts());
    }

    #[tokio::test]
    async fn non_allowlisted_host_allowed() {
        let fx = fixture(T0).await;
        assert!(!fx.decision.should_intercept("https://example.org/").await);
    }

    #[tokio::test]
    async fn disabled_short_circuits() {
        let fx = fixture(T0).await;
        let mut s = Settings::default();
        s.enabled = false;
        fx.state.save_settings(&s).await.unwrap();

        let d = fx.decision.evaluate("https://reddit.com/").await.unwrap();
        assert_eq!(d, Decision::Disabled);
    }

    #[tokio::test]
    async fn disabled_does_not_consume_bypass() {
        let fx = fixture(T0).await;
        let mut s = Settings::default();
        s.enabled = false;
        fx.state.save_settings(&s).await.unwrap();
        fx.state.set_bypass_marker("reddit.com", T0).await.unwrap();

        assert!(!fx.decision.should_intercept("https://reddit.com/").await);
        assert_eq!(fx.state.bypass_marker("reddit.com").await.unwrap(), Some(T0));
    }

    #[tokio::test]
    async fn timeout_boundary_is_inclusive() {
        let fx = fixture(T0).await;
        fx.state.set_connection_time("reddit.com", T0 - TEN_MIN).await.unwrap();
        assert!(fx.decision.should_intercept("https://reddit.com/").await);

        fx.state
            .set_connection_time("reddit.com", T0 - TEN_MIN + 1)
            .await
            .unwrap();
        let d = fx.decision.evaluate("https://reddit.com/").await.unwrap();
        assert_eq!(
            d,
            Decision::Connected {
                domain: "reddit.com".into(),
                elapsed_ms: TEN_MIN - 1
            }
        );
    }

    #[tokio::test]
    async fn fresh_bypass_is_single_use() {
        let fx = fixture(T0).await;
        fx.state.set_bypass_marker("reddit.com", T0).await.unwrap();

        let d = fx.decision.evaluate("https://reddit.com/").await.unwrap();
        assert_eq!(d, Decision::Bypassed { domain: "reddit.com".into() });
        assert_eq!(fx.state.bypass_marker("reddit.com").await.unwrap(), None);

        // Never connected, so the next navigation is intercepted again.
        assert!(fx.decision.should_intercept("https://reddit.com/").await);
    }

    #[tokio::test]
    async fn stale_bypass_is_consumed_but_ignored() {
        let fx = fixture(T0).await;
        fx.state
            .set_bypass_marker("reddit.com", T0 - BYPASS_WINDOW_MS)
            .await
            .unwrap();

        assert!(fx.decision.should_intercept("https://reddit.com/").await);
        assert_eq!(fx.state.bypass_marker("reddit.com").await.unwrap(), None);
    }

    #[tokio::test]
    async fn bypass_just_inside_window_allows() {
        let fx = fixture(T0).await;
        fx.state
            .set_bypass_marker("reddit.com", T0 - BYPASS_WINDOW_MS + 1)
            .await
            .unwrap();
        assert!(!fx.decision.should_intercept("https://reddit.com/").await);
    }

    #[tokio::test]
    async fn malformed_url_fails_open() {
        let fx = fixture(T0).await;
        assert!(fx.decision.evaluate("not a url").await.is_err());
        assert!(!fx.decision.should_intercept("not a url").await);
    }

    #[tokio::test]
    async fn missing_settings_treated_as_disabled() {
        let fx = fixture(T0).await;
        fx.store.remove(&["settings"]).await.unwrap();
        let d = fx.decision.evaluate("https://reddit.com/").await.unwrap();
        assert_eq!(d, Decision::NoSettings);
        assert!(!d.intercepts());
    }

    #[tokio::test]
    async fn storage_failure_fails_open() {
        let store: Arc<dyn KeyValueStore> = Arc::new(FailingStore);
        let clock: Arc<dyn Clock> = Arc::new(dialup_types::clock::ManualClock::new(T0));
        let engine = DecisionEngine::new(StateStore::new(store), clock, BYPASS_WINDOW_MS);
        assert!(!engine.should_intercept("https://reddit.com/").await);
    }

    #[tokio::test]
    async fn non_web_schemes_are_ignored() {
        let fx = fixture(T0).await;
        let d = fx.decision.evaluate("ftp://reddit.com/pub").await.unwrap();
        assert_eq!(d, Decision::NotAllowlisted);
        let d = fx.decision.evaluate("dialup://splash.html?tabId=1").await.unwrap();
        assert_eq!(d, Decision::NotAllowlisted);
    }

    #[tokio::test]
    async fn uppercase_host_matches_after_parse() {
        let fx = fixture(T0).await;
        let d = fx.decision.evaluate("https://WWW.Reddit.COM/").await.unwrap();
        assert_eq!(d.domain(), Some("reddit.com"));
    }
}
