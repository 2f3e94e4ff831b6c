//! dialup terminal simulator.
//!
//! Hosts the interception engine behind a tiny line-driven browser:
//! `open 1 https://www.reddit.com/` plays the dial-up splash on a first
//! visit and loads the page directly while the connection is fresh.
//! Type `help` for the full command list.

mod browser;
mod commands;
mod splash;

use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use dialup_engine::{EngineConfig, NavigationInterceptor};
use dialup_store::{JsonFileStore, KeyValueStore, MemoryStore};
use dialup_types::clock::SystemClock;
use tokio::io::{AsyncBufReadExt, BufReader};

use browser::Browser;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Resolve config from CLI arg, DIALUP_CONFIG env var, or defaults.
    let config = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("DIALUP_CONFIG").ok())
    {
        Some(path) => {
            log::info!("Loading config from {path}");
            EngineConfig::load(&path)?
        },
        None => EngineConfig::default(),
    };

    let store: Arc<dyn KeyValueStore> = match &config.store_path {
        Some(path) => {
            log::info!("Persisting state to {}", path.display());
            Arc::new(JsonFileStore::open(path).await?)
        },
        None => Arc::new(MemoryStore::new()),
    };

    let interceptor = Arc::new(NavigationInterceptor::new(
        store,
        Arc::new(SystemClock),
        &config,
    ));
    interceptor.on_installed().await;
    let sweeper = interceptor.pending().spawn_sweeper(config.sweep_interval());

    log::info!("Starting dialup (splash at {})", config.splash_url);
    let mut browser = Browser::new(Arc::clone(&interceptor), &config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("dialup> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let cmd = match commands::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            },
        };
        if !browser.execute(cmd, &mut |l| println!("{l}")).await {
            break;
        }
    }

    sweeper.shutdown().await?;
    log::info!("Shutting down");
    Ok(())
}
