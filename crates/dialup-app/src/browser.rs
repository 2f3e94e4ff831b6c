//! A minimal browser: tabs with a current URL, navigation through the
//! interceptor, and the splash page hosted in-process.

use std::collections::BTreeMap;
use std::sync::Arc;

use dialup_engine::{Action, EngineConfig, Message, NavigationEvent, NavigationInterceptor, Response};
use dialup_types::tab::TabId;

use crate::commands::{Command, HELP};
use crate::splash::SplashPlayer;

/// Redirect hops followed for one navigation before giving up.
const MAX_HOPS: usize = 4;

pub struct Browser {
    interceptor: Arc<NavigationInterceptor>,
    splash_base: String,
    splash_speed: f64,
    tabs: BTreeMap<TabId, String>,
}

impl Browser {
    pub fn new(interceptor: Arc<NavigationInterceptor>, config: &EngineConfig) -> Self {
        Self {
            interceptor,
            splash_base: config.splash_url.clone(),
            splash_speed: config.splash_speed,
            tabs: BTreeMap::new(),
        }
    }

    /// Current URL of `tab`, if it was ever opened.
    #[cfg(test)]
    pub fn tab_url(&self, tab: TabId) -> Option<&str> {
        self.tabs.get(&tab).map(String::as_str)
    }

    /// Run one command. Returns `false` when the shell should exit.
    pub async fn execute(&mut self, cmd: Command, out: &mut impl FnMut(String)) -> bool {
        match cmd {
            Command::Open { tab, url } => self.open(tab, url, out).await,
            Command::Frame { tab, frame, url } => {
                let event = NavigationEvent {
                    tab_id: tab,
                    url: url.clone(),
                    frame_id: frame,
                };
                let action = self.interceptor.on_before_navigate(&event).await;
                out(format!("tab {tab} frame {}: {action:?} {url}", frame.0));
            },
            Command::Tabs => {
                if self.tabs.is_empty() {
                    out("No open tabs.".to_string());
                }
                for (tab, url) in &self.tabs {
                    out(format!("{:>4}  {url}", tab.0));
                }
            },
            Command::Pending(tab) => {
                let response = self
                    .interceptor
                    .handle_message(Message::GetPendingUrl { tab_id: tab })
                    .await;
                out(render(&response));
            },
            Command::Status => {
                match self.interceptor.handle_message(Message::GetStatus).await {
                    Response::Status { enabled, summary } => {
                        out(format!("[{}] {summary}", if enabled { "ON" } else { "OFF" }));
                    },
                    other => out(render(&other)),
                }
            },
            Command::Toggle => {
                let response = self.interceptor.handle_message(Message::ToggleEnabled).await;
                out(render(&response));
            },
            Command::Settings => {
                let response = self.interceptor.handle_message(Message::GetSettings).await;
                out(render(&response));
            },
            Command::Save(form) => {
                let response = self
                    .interceptor
                    .handle_message(Message::SaveSettings { form })
                    .await;
                out(render(&response));
            },
            Command::Reset => {
                let response = self.interceptor.handle_message(Message::ResetSettings).await;
                out(render(&response));
            },
            Command::Sweep => match self.interceptor.pending().sweep().await {
                Ok(swept) if swept.is_empty() => out("Nothing to sweep.".to_string()),
                Ok(swept) => {
                    let ids: Vec<String> = swept.iter().map(TabId::to_string).collect();
                    out(format!("Swept tabs: {}", ids.join(", ")));
                },
                Err(e) => out(format!("sweep failed: {e}")),
            },
            Command::Help => out(HELP.to_string()),
            Command::Quit => return false,
        }
        true
    }

    /// Top-level navigation, following interceptor redirects and playing
    /// the splash whenever the tab lands on it.
    async fn open(&mut self, tab: TabId, url: String, out: &mut impl FnMut(String)) {
        let mut target = url;
        for _ in 0..MAX_HOPS {
            let event = NavigationEvent::main_frame(tab, target.clone());
            match self.interceptor.on_before_navigate(&event).await {
                Action::Allow => {
                    out(format!("tab {tab}: loaded {target}"));
                    self.tabs.insert(tab, target);
                    return;
                },
                Action::RedirectTo(next) => {
                    out(format!("tab {tab}: redirected to {next}"));
                    self.tabs.insert(tab, next.clone());
                    if !self.is_splash(&next) {
                        target = next;
                        continue;
                    }

                    let player = SplashPlayer::new(&self.interceptor, self.splash_speed);
                    match player.play(&next, &mut *out).await {
                        Ok(Action::RedirectTo(dest)) => target = dest,
                        Ok(Action::Allow) => {
                            out(format!("tab {tab}: connection failed, staying on splash"));
                            return;
                        },
                        Err(e) => {
                            out(e.to_string());
                            return;
                        },
                    }
                },
            }
        }
        log::warn!("Too many redirects in tab {tab}");
        out(format!("tab {tab}: too many redirects"));
    }

    fn is_splash(&self, url: &str) -> bool {
        url.starts_with(&self.splash_base)
    }
}

fn render(response: &Response) -> String {
    serde_json::to_string(response).unwrap_or_else(|e| format!("<unprintable response: {e}>"))
}
