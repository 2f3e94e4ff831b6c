//! Engine configuration and timing constants.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dialup_types::error::{DialupError, Result};
use serde::Deserialize;

/// How long a bypass marker stays valid after the splash completes.
/// Covers the gap between completion and the redirect-back navigation.
pub const BYPASS_WINDOW_MS: u64 = 5_000;

/// Age after which a pending navigation is considered orphaned.
pub const PENDING_MAX_AGE_MS: u64 = 5 * 60 * 1_000;

/// Period of the orphaned-pending sweep.
pub const SWEEP_INTERVAL_MS: u64 = 60_000;

/// Splash resource the interceptor redirects to.
pub const DEFAULT_SPLASH_URL: &str = "dialup://splash.html";

/// Engine configuration (from `dialup.toml`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Lifetime of a bypass marker in milliseconds.
    pub bypass_window_ms: u64,
    /// Pending navigations older than this are swept.
    pub pending_max_age_ms: u64,
    /// Sweep period in milliseconds.
    pub sweep_interval_ms: u64,
    /// Base URL of the splash page; `?tabId=<id>` is appended.
    pub splash_url: String,
    /// Persist state to this JSON file. In-memory when unset.
    pub store_path: Option<PathBuf>,
    /// Playback speed multiplier for the splash timeline.
    pub splash_speed: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            bypass_window_ms: BYPASS_WINDOW_MS,
            pending_max_age_ms: PENDING_MAX_AGE_MS,
            sweep_interval_ms: SWEEP_INTERVAL_MS,
            splash_url: DEFAULT_SPLASH_URL.to_string(),
            store_path: None,
            splash_speed: 1.0,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| DialupError::Config(format!("dialup.toml: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bypass_window_ms == 0 {
            return Err(DialupError::Config("bypass_window_ms must be non-zero".into()));
        }
        if self.pending_max_age_ms == 0 {
            return Err(DialupError::Config("pending_max_age_ms must be non-zero".into()));
        }
        if self.sweep_interval_ms == 0 {
            return Err(DialupError::Config("sweep_interval_ms must be non-zero".into()));
        }
        if !(self.splash_speed.is_finite() && self.splash_speed > 0.0) {
            return Err(DialupError::Config(format!(
                "splash_speed must be positive, got {}",
                self.splash_speed
            )));
        }
        url::Url::parse(&self.splash_url)
            .map_err(|e| DialupError::Config(format!("splash_url {:?}: {e}", self.splash_url)))?;
        Ok(())
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_match_constants() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.bypass_window_ms, 5_000);
        assert_eq!(cfg.pending_max_age_ms, 300_000);
        assert_eq!(cfg.sweep_interval(), Duration::from_secs(60));
        assert_eq!(cfg.splash_url, "dialup://splash.html");
        assert!(cfg.store_path.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let cfg = EngineConfig::from_toml_str(
            r#"
bypass_window_ms = 2000
store_path = "/tmp/dialup/state.json"
splash_speed = 4.0
"#,
        )
        .unwrap();
        assert_eq!(cfg.bypass_window_ms, 2_000);
        assert_eq!(cfg.pending_max_age_ms, PENDING_MAX_AGE_MS);
        assert_eq!(
            cfg.store_path.as_deref(),
            Some(Path::new("/tmp/dialup/state.json"))
        );
        assert!((cfg.splash_speed - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_window_rejected() {
        let err = EngineConfig::from_toml_str("bypass_window_ms = 0").unwrap_err();
        assert!(format!("{err}").contains("bypass_window_ms"));
    }

    #[test]
    fn non_positive_speed_rejected() {
        assert!(EngineConfig::from_toml_str("splash_speed = 0.0").is_err());
        assert!(EngineConfig::from_toml_str("splash_speed = -2.0").is_err());
    }

    #[test]
    fn bad_splash_url_rejected() {
        assert!(EngineConfig::from_toml_str("splash_url = \"no scheme\"").is_err());
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = EngineConfig::from_toml_str("this is [[[not valid").unwrap_err();
        assert!(format!("{err}").starts_with("config error"));
    }
}
