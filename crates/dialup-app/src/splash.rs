//! Terminal rendition of the splash page.
//!
//! Talks to the engine only through [`Message`]s, the same way the real
//! splash page would: look up the destination, read the volume, play the
//! stage table, then report completion.

use std::time::Duration;

use dialup_engine::splash::{
    COMPLETION_HOLD_MS, CONNECTION_STAGES, connecting_label, splash_tab_id, status_line,
};
use dialup_engine::{Action, Message, NavigationInterceptor, Response};
use dialup_types::settings::DEFAULT_VOLUME;

/// Why a splash could not start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SplashError {
    /// The splash URL has no usable tab id.
    #[error("Error: Invalid connection request")]
    InvalidRequest,
    /// The engine has no destination for the tab.
    #[error("Error: No destination URL")]
    NoDestination,
}

pub struct SplashPlayer<'a> {
    interceptor: &'a NavigationInterceptor,
    /// Playback speed multiplier; 2.0 plays twice as fast.
    speed: f64,
}

impl<'a> SplashPlayer<'a> {
    pub fn new(interceptor: &'a NavigationInterceptor, speed: f64) -> Self {
        Self { interceptor, speed }
    }

    /// Play the splash loaded at `splash_url` and return what the tab
    /// should do next. Output lines are passed to `out` as they appear.
    pub async fn play(
        &self,
        splash_url: &str,
        mut out: impl FnMut(String),
    ) -> Result<Action, SplashError> {
        let tab = splash_tab_id(splash_url).ok_or(SplashError::InvalidRequest)?;

        let destination = match self
            .interceptor
            .handle_message(Message::GetPendingUrl { tab_id: tab })
            .await
        {
            Response::Pending(Some(pending)) => pending.url,
            _ => return Err(SplashError::NoDestination),
        };

        let volume = match self.interceptor.handle_message(Message::GetSettings).await {
            Response::Settings(Some(settings)) => settings.volume,
            _ => DEFAULT_VOLUME,
        };

        if let Some(label) = connecting_label(&destination) {
            out(label);
        }
        out(format!("[audio] dial-up tone at {:.0}% volume", volume * 100.0));

        for (index, stage) in CONNECTION_STAGES.iter().enumerate() {
            self.pause(stage.delay_ms).await;
            out(format!(
                "  line {} | {:>3}% | {}",
                status_line(index),
                stage.progress,
                stage.message
            ));
        }
        self.pause(COMPLETION_HOLD_MS).await;

        match self
            .interceptor
            .handle_message(Message::ConnectionComplete {
                tab_id: tab,
                url: destination,
            })
            .await
        {
            Response::Navigate { action } => Ok(action),
            other => {
                log::warn!("Unexpected completion response: {other:?}");
                Ok(Action::Allow)
            },
        }
    }

    async fn pause(&self, ms: u64) {
        if ms == 0 {
            return;
        }
        let scaled = (ms as f64 / self.speed).round() as u64;
        tokio::time::sleep(Duration::from_millis(scaled)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use dialup_engine::{EngineConfig, NavigationEvent};
    use dialup_store::MemoryStore;
    use dialup_types::clock::SystemClock;
    use dialup_types::tab::TabId;

    async fn interceptor() -> NavigationInterceptor {
        let i = NavigationInterceptor::new(
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
            &EngineConfig::default(),
        );
        i.on_installed().await;
        i
    }

    #[tokio::test(start_paused = true)]
    async fn plays_all_stages_and_completes() {
        let i = interceptor().await;
        let url = "https://www.reddit.com/";
        let Action::RedirectTo(splash) = i
            .on_before_navigate(&NavigationEvent::main_frame(TabId(3), url))
            .await
        else {
            panic!("expected interception");
        };

        let mut lines = Vec::new();
        let action = SplashPlayer::new(&i, 1.0)
            .play(&splash, |l| lines.push(l))
            .await
            .unwrap();

        assert_eq!(action, Action::RedirectTo(url.into()));
        assert_eq!(lines[0], "Connecting to www.reddit.com...");
        assert!(lines[1].contains("30% volume"));
        assert_eq!(lines.len(), 2 + CONNECTION_STAGES.len());
        assert!(lines.last().unwrap().contains("Connection established!"));
    }

    #[tokio::test]
    async fn missing_tab_id_is_invalid() {
        let i = interceptor().await;
        let err = SplashPlayer::new(&i, 1.0)
            .play("dialup://splash.html", |_| {})
            .await
            .unwrap_err();
        assert_eq!(err, SplashError::InvalidRequest);
        assert_eq!(err.to_string(), "Error: Invalid connection request");
    }

    #[test]
    fn splash_error_converts_to_anyhow() {
        let err: anyhow::Error = SplashError::NoDestination.into();
        assert_eq!(err.to_string(), "Error: No destination URL");
        assert!(err.downcast_ref::<SplashError>().is_some());
    }

    #[tokio::test]
    async fn unknown_tab_has_no_destination() {
        let i = interceptor().await;
        let err = SplashPlayer::new(&i, 1.0)
            .play("dialup://splash.html?tabId=44", |_| {})
            .await
            .unwrap_err();
        assert_eq!(err, SplashError::NoDestination);
        assert_eq!(err.to_string(), "Error: No destination URL");
    }
}
