mod config;
mod cycle;
mod filter;
mod model;
mod notifier;
mod parser;
mod scraper;
mod storage;
mod utils;

use chrono::Utc;
use config::{load_config, AppConfig, FeedConfig};
use cycle::{run_cycle, CycleOutcome, CycleSettings};
use futures::future::join_all;
use notifier::TelegramNotifier;
use parser::CatalogParser;
use scraper::CatalogFetcher;
use std::sync::Arc;
use storage::SqliteStorage;
use tokio::sync::{Mutex, Notify};
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config: Arc<AppConfig> = match load_config(&config_path) {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error ({}): {}", config_path, e);
            return;
        }
    };

    let deadline = Duration::from_secs(config.request_timeout_seconds);
    let fetcher = match CatalogFetcher::new(deadline) {
        Ok(f) => f,
        Err(e) => {
            error!("Failed to build HTTP client: {}", e);
            return;
        }
    };
    let parser = CatalogParser::new();
    let settings = CycleSettings::from(config.as_ref());

    let storage = match SqliteStorage::new(&config.db_path) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            return;
        }
    };

    let refresh_notify = Arc::new(Notify::new());
    let notifier = match TelegramNotifier::new(
        config.telegram_bot_token.clone(),
        config.telegram_chat_id,
        deadline,
        storage.clone(),
        refresh_notify.clone(),
    ) {
        Ok(n) => Arc::new(n),
        Err(e) => {
            error!("Failed to initialize notifier: {}", e);
            return;
        }
    };

    if let Err(e) = notifier.set_my_commands().await {
        warn!("Registering bot commands failed: {}", e);
    }
    TelegramNotifier::spawn_listener(notifier.clone());

    info!("Sending startup message...");
    if let Err(e) = notifier.notify_text("🚀 FreebieSniper started!").await {
        warn!("Startup notification failed: {}", e);
    }

    loop {
        info!("Checking {} feeds...", config.feeds.len());
        let now = Utc::now();

        let tasks: Vec<_> = config
            .feeds
            .iter()
            .map(|feed| process_feed(feed, &fetcher, &parser, &notifier, &storage, &settings, now))
            .collect();
        join_all(tasks).await;

        info!(
            "Waiting for timer ({}s) or manual refresh...",
            config.check_interval_seconds
        );
        tokio::select! {
            _ = sleep(Duration::from_secs(config.check_interval_seconds)) => {
                info!("Timer triggered.");
            }
            _ = refresh_notify.notified() => {
                info!("Manual refresh triggered.");
            }
        }
    }
}

/// Runs one cycle for a feed and logs its outcome; failures never stop the loop.
async fn process_feed(
    feed: &FeedConfig,
    fetcher: &CatalogFetcher,
    parser: &CatalogParser,
    notifier: &Arc<TelegramNotifier>,
    storage: &Arc<Mutex<SqliteStorage>>,
    settings: &CycleSettings,
    now: chrono::DateTime<Utc>,
) {
    match run_cycle(feed, fetcher, parser, notifier.as_ref(), storage, settings, now).await {
        Ok(CycleOutcome::Published(n)) => info!("[{}] notified {} games", feed.name, n),
        Ok(CycleOutcome::Unchanged(n)) => info!("[{}] {} games already announced", feed.name, n),
        Ok(CycleOutcome::NothingNew) => {}
        Err(e) => warn!("[{}] cycle failed: {}", feed.name, e),
    }
}
