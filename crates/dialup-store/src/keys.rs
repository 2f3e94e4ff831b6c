//! Storage key naming.

use dialup_types::tab::TabId;

/// The [`Settings`](dialup_types::settings::Settings) record.
pub const SETTINGS: &str = "settings";
/// Map of matched domain to last connection timestamp.
pub const CONNECTION_TIMES: &str = "connectionTimes";

pub const BYPASS_PREFIX: &str = "bypass_";
pub const PENDING_PREFIX: &str = "pending_";

/// Key of the bypass marker for a matched domain.
pub fn bypass_key(domain: &str) -> String {
    format!("{BYPASS_PREFIX}{domain}")
}

/// Key of the pending navigation for a tab.
pub fn pending_key(tab: TabId) -> String {
    format!("{PENDING_PREFIX}{tab}")
}

/// Recover the tab id from a pending-navigation key.
pub fn parse_pending_key(key: &str) -> Option<TabId> {
    key.strip_prefix(PENDING_PREFIX)?.parse().ok()
}
