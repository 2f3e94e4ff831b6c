//! Splash page contract: its URL, and the fixed connection timeline it plays.
//!
//! The engine never plays the timeline itself. It only needs to build
//! the splash URL for a tab; the stage table is exported for whichever
//! front end renders the splash.

use dialup_types::error::Result;
use dialup_types::tab::TabId;
use url::Url;

/// Query parameter carrying the tab id on the splash URL.
pub const TAB_ID_PARAM: &str = "tabId";

/// Number of status lines on the splash screen. Stages past the last
/// line keep overwriting it.
pub const STATUS_LINES: usize = 5;

/// Pause after the final stage before reporting completion.
pub const COMPLETION_HOLD_MS: u64 = 500;

/// One step of the simulated modem handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionStage {
    /// Wait before showing this stage, relative to the previous one.
    pub delay_ms: u64,
    pub message: &'static str,
    /// Progress bar fill, 0-100.
    pub progress: u8,
}

#[rustfmt::skip]
pub const CONNECTION_STAGES: [ConnectionStage; 8] = [
    ConnectionStage { delay_ms: 0, message: "Initializing modem...", progress: 0 },
    ConnectionStage { delay_ms: 800, message: "Dialing ISP...", progress: 15 },
    ConnectionStage { delay_ms: 1800, message: "Waiting for carrier tone...", progress: 30 },
    ConnectionStage { delay_ms: 3000, message: "Negotiating connection...", progress: 45 },
    ConnectionStage { delay_ms: 4200, message: "Verifying username and password...", progress: 60 },
    ConnectionStage { delay_ms: 5400, message: "Establishing PPP connection...", progress: 75 },
    ConnectionStage { delay_ms: 6600, message: "Configuring network settings...", progress: 85 },
    ConnectionStage { delay_ms: 7500, message: "Connection established!", progress: 100 },
];

/// Status line (1-based) that stage `index` is written to.
pub fn status_line(index: usize) -> usize {
    (index + 1).min(STATUS_LINES)
}

/// Total time the timeline takes, completion hold included.
pub fn total_duration_ms() -> u64 {
    CONNECTION_STAGES.iter().map(|s| s.delay_ms).sum::<u64>() + COMPLETION_HOLD_MS
}

/// Build the splash URL for `tab` from the configured base.
pub fn splash_url(base: &str, tab: TabId) -> Result<String> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut()
        .append_pair(TAB_ID_PARAM, &tab.to_string());
    Ok(url.into())
}

/// Extract the tab id from a splash URL. `None` if absent or not a
/// positive integer.
pub fn splash_tab_id(splash: &str) -> Option<TabId> {
    let url = Url::parse(splash).ok()?;
    let (_, value) = url.query_pairs().find(|(k, _)| k == TAB_ID_PARAM)?;
    let tab: TabId = value.parse().ok()?;
    (tab.0 != 0).then_some(tab)
}

/// Banner shown while dialing, e.g. `Connecting to www.reddit.com...`.
pub fn connecting_label(destination: &str) -> Option<String> {
    let url = Url::parse(destination).ok()?;
    url.host_str().map(|host| format!("Connecting to {host}..."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splash_url_appends_tab_id() {
        let url = splash_url("dialup://splash.html", TabId(12)).unwrap();
        assert_eq!(url, "dialup://splash.html?tabId=12");
        assert_eq!(splash_tab_id(&url), Some(TabId(12)));
    }

    #[test]
    fn splash_url_keeps_existing_query() {
        let url = splash_url("https://ext.local/splash.html?theme=dark", TabId(3)).unwrap();
        assert_eq!(url, "https://ext.local/splash.html?theme=dark&tabId=3");
        assert_eq!(splash_tab_id(&url), Some(TabId(3)));
    }

    #[test]
    fn splash_tab_id_rejects_missing_or_bad_values() {
        assert_eq!(splash_tab_id("dialup://splash.html"), None);
        assert_eq!(splash_tab_id("dialup://splash.html?tabId=abc"), None);
        assert_eq!(splash_tab_id("dialup://splash.html?tabId=0"), None);
        assert_eq!(splash_tab_id("not a url"), None);
    }

    #[test]
    fn stages_progress_monotonically_to_full() {
        let progress: Vec<u8> = CONNECTION_STAGES.iter().map(|s| s.progress).collect();
        assert!(progress.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(progress.last(), Some(&100));
    }

    #[test]
    fn status_lines_saturate() {
        assert_eq!(status_line(0), 1);
        assert_eq!(status_line(4), 5);
        assert_eq!(status_line(7), 5);
    }

    #[test]
    fn total_duration_includes_hold() {
        assert_eq!(total_duration_ms(), 29_300 + 500);
    }

    #[test]
    fn connecting_label_uses_host() {
        assert_eq!(
            connecting_label("https://www.reddit.com/r/test").as_deref(),
            Some("Connecting to www.reddit.com...")
        );
        assert_eq!(connecting_label("garbage"), None);
    }
}
