//! The persisted settings record and the options-form validation rules.

use serde::{Deserialize, Serialize};

use crate::error::{DialupError, Result};

/// Shortest idle timeout the options form accepts, in minutes.
pub const MIN_TIMEOUT_MINUTES: u32 = 1;
/// Longest idle timeout the options form accepts (one day), in minutes.
pub const MAX_TIMEOUT_MINUTES: u32 = 1440;

pub const DEFAULT_TIMEOUT_MINUTES: u32 = 10;
pub const DEFAULT_VOLUME: f64 = 0.3;

/// Sites that trigger the splash on a fresh install.
pub const DEFAULT_ALLOWLIST: [&str; 5] = [
    "facebook.com",
    "instagram.com",
    "reddit.com",
    "twitter.com",
    "x.com",
];

/// User configuration, stored under the `settings` key.
///
/// Field names serialize in camelCase so the record matches what the
/// options page and popup read and write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Bare registrable domains, in display order.
    pub allowlist: Vec<String>,
    /// Idle time after which a site needs to "dial in" again.
    pub timeout_minutes: u32,
    /// Splash audio volume in `[0.0, 1.0]`.
    pub volume: f64,
    /// Master switch flipped by the toggle popup.
    pub enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allowlist: DEFAULT_ALLOWLIST.iter().map(|d| d.to_string()).collect(),
            timeout_minutes: DEFAULT_TIMEOUT_MINUTES,
            volume: DEFAULT_VOLUME,
            enabled: true,
        }
    }
}

impl Settings {
    /// Idle timeout in milliseconds.
    pub fn timeout_ms(&self) -> u64 {
        u64::from(self.timeout_minutes) * 60_000
    }

    /// One-line status shown by the toggle popup.
    pub fn summary(&self) -> String {
        if self.enabled {
            format!(
                "{} site(s) in allowlist \u{2022} {} min timeout",
                self.allowlist.len(),
                self.timeout_minutes
            )
        } else {
            "Extension is currently disabled.".to_string()
        }
    }
}

/// Raw values as entered on the options page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsForm {
    /// One domain per line; blank lines are ignored.
    pub allowlist_text: String,
    pub timeout_minutes: i64,
    /// Volume as a whole percentage, 0-100.
    pub volume_percent: i64,
}

impl SettingsForm {
    /// Build a form pre-filled from existing settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            allowlist_text: settings.allowlist.join("\n"),
            timeout_minutes: i64::from(settings.timeout_minutes),
            volume_percent: (settings.volume * 100.0).round() as i64,
        }
    }

    /// Validate the form and produce a settings record carrying `enabled`.
    pub fn into_settings(self, enabled: bool) -> Result<Settings> {
        let allowlist = parse_allowlist(&self.allowlist_text);
        if allowlist.is_empty() {
            return Err(DialupError::Settings("allowlist is empty".into()));
        }

        let min = i64::from(MIN_TIMEOUT_MINUTES);
        let max = i64::from(MAX_TIMEOUT_MINUTES);
        if !(min..=max).contains(&self.timeout_minutes) {
            return Err(DialupError::Settings(format!(
                "timeout must be between {min} and {max} minutes, got {}",
                self.timeout_minutes
            )));
        }

        if !(0..=100).contains(&self.volume_percent) {
            return Err(DialupError::Settings(format!(
                "volume must be between 0 and 100 percent, got {}",
                self.volume_percent
            )));
        }

        Ok(Settings {
            allowlist,
            timeout_minutes: self.timeout_minutes as u32,
            volume: self.volume_percent as f64 / 100.0,
            enabled,
        })
    }
}

/// Split allowlist text into trimmed, lowercased, non-empty lines.
pub fn parse_allowlist(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}
