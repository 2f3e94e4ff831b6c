//! Request/response messages between the engine and its pages
//! (splash, options, popup).
//!
//! Messages are tagged by `type` so they can cross a JSON channel:
//!
//! ```json
//! {"type": "GET_PENDING_URL", "tabId": 4}
//! {"type": "CONNECTION_COMPLETE", "tabId": 4, "url": "https://www.reddit.com/"}
//! ```
//!
//! [`NavigationInterceptor::handle_message`] never fails; every error
//! becomes a best-effort [`Response`].

use dialup_types::settings::{Settings, SettingsForm};
use dialup_types::tab::TabId;
use serde::{Deserialize, Serialize};

use crate::interceptor::{Action, NavigationInterceptor};
use crate::state::PendingNavigation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Splash page asks where its tab is headed.
    GetPendingUrl {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
    GetSettings,
    /// Splash page finished its timeline.
    ConnectionComplete {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        url: String,
    },
    /// Options page "reset to defaults".
    ResetSettings,
    /// Options page auto-save.
    SaveSettings { form: SettingsForm },
    /// Popup on/off switch.
    ToggleEnabled,
    /// Popup status line.
    GetStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// `null` when the tab has no pending destination.
    Pending(Option<PendingNavigation>),
    /// `null` when settings are missing or unreadable.
    Settings(Option<Settings>),
    Success { success: bool },
    /// Result of a completed connection: what to do with the tab.
    Navigate { action: Action },
    Status { enabled: bool, summary: String },
    Error { error: String },
}

impl NavigationInterceptor {
    /// Dispatch one message.
    pub async fn handle_message(&self, message: Message) -> Response {
        match message {
            Message::GetPendingUrl { tab_id } => {
                match self.pending().consume_pending(tab_id).await {
                    Ok(pending) => Response::Pending(pending),
                    Err(e) => {
                        log::error!("Error reading pending URL for tab {tab_id}: {e}");
                        Response::Pending(None)
                    },
                }
            },
            Message::GetSettings => match self.state().settings().await {
                Ok(settings) => Response::Settings(settings),
                Err(e) => {
                    log::error!("Error reading settings: {e}");
                    Response::Settings(None)
                },
            },
            Message::ConnectionComplete { tab_id, url } => Response::Navigate {
                action: self.on_connection_complete(tab_id, &url).await,
            },
            Message::ResetSettings => self.reset_settings().await,
            Message::SaveSettings { form } => self.save_settings(form).await,
            Message::ToggleEnabled => self.toggle_enabled().await,
            Message::GetStatus => match self.state().settings().await {
                Ok(Some(settings)) => Response::Status {
                    enabled: settings.enabled,
                    summary: settings.summary(),
                },
                Ok(None) => Response::Error {
                    error: "Settings not initialized".into(),
                },
                Err(e) => {
                    log::error!("Error loading status: {e}");
                    Response::Error {
                        error: e.to_string(),
                    }
                },
            },
        }
    }

    async fn reset_settings(&self) -> Response {
        match self.state().save_settings(&Settings::default()).await {
            Ok(()) => {
                log::info!("Settings reset to defaults");
                Response::Success { success: true }
            },
            Err(e) => {
                log::error!("Error resetting settings: {e}");
                Response::Error {
                    error: e.to_string(),
                }
            },
        }
    }

    /// Validate and store an options form, keeping the current
    /// `enabled` flag. No-op when settings were never initialised.
    async fn save_settings(&self, form: SettingsForm) -> Response {
        let current = match self.state().settings().await {
            Ok(Some(current)) => current,
            Ok(None) => {
                return Response::Error {
                    error: "Settings not initialized".into(),
                };
            },
            Err(e) => {
                log::error!("Error loading settings: {e}");
                return Response::Error {
                    error: e.to_string(),
                };
            },
        };

        let settings = match form.into_settings(current.enabled) {
            Ok(settings) => settings,
            Err(e) => {
                log::debug!("Rejected settings form: {e}");
                return Response::Error {
                    error: e.to_string(),
                };
            },
        };

        match self.state().save_settings(&settings).await {
            Ok(()) => Response::Settings(Some(settings)),
            Err(e) => {
                log::error!("Error saving settings: {e}");
                Response::Error {
                    error: e.to_string(),
                }
            },
        }
    }

    async fn toggle_enabled(&self) -> Response {
        let mut settings = match self.state().settings().await {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                return Response::Error {
                    error: "Settings not initialized".into(),
                };
            },
            Err(e) => {
                log::error!("Error toggling status: {e}");
                return Response::Error {
                    error: e.to_string(),
                };
            },
        };

        settings.enabled = !settings.enabled;
        match self.state().save_settings(&settings).await {
            Ok(()) => {
                log::info!(
                    "dialup {}",
                    if settings.enabled { "enabled" } else { "disabled" }
                );
                Response::Settings(Some(settings))
            },
            Err(e) => {
                log::error!("Error toggling status: {e}");
                Response::Error {
                    error: e.to_string(),
                }
            },
        }
    }
}
