pub mod command_handler;
pub mod listener;
pub mod sender;

use crate::config::FeedConfig;
use crate::filter::PublishMap;
use crate::model::NotifyError;
use crate::notifier::Publisher;
use crate::storage::SqliteStorage;
use reqwest::Client;
use std::sync::atomic::AtomicI64;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Notify};

pub struct TelegramNotifier {
    pub bot_token: String,
    pub chat_id: i64,
    pub client: Client,
    pub deadline: Duration,
    pub offset: Arc<AtomicI64>,
    pub storage: Arc<Mutex<SqliteStorage>>,
    pub start_time: Instant,
    pub refresh_notify: Arc<Notify>,
}

impl TelegramNotifier {
    pub fn new(
        bot_token: String,
        chat_id: i64,
        deadline: Duration,
        storage: Arc<Mutex<SqliteStorage>>,
        refresh_notify: Arc<Notify>,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(deadline).build()?;
        Ok(Self {
            bot_token,
            chat_id,
            client,
            deadline,
            offset: Arc::new(AtomicI64::new(0)),
            storage,
            start_time: Instant::now(),
            refresh_notify,
        })
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }

    pub async fn notify_text(&self, text: &str) -> Result<(), NotifyError> {
        sender::send_text(self, text).await
    }

    pub async fn listen_for_commands(&self) {
        listener::listen_for_commands(self).await;
    }

    pub async fn set_my_commands(&self) -> Result<(), NotifyError> {
        let commands = serde_json::json!({
            "commands": [
                { "command": "ping", "description": "Check connection" },
                { "command": "help", "description": "Command list" },
                { "command": "last", "description": "Last published free games" },
                { "command": "refresh", "description": "Check the feeds now" },
                { "command": "uptime", "description": "Service uptime" }
            ]
        });
        let response = self
            .client
            .post(self.api_url("setMyCommands"))
            .json(&commands)
            .send()
            .await?;
        sender::ensure_success(response).await
    }

    pub fn spawn_listener(notifier: Arc<TelegramNotifier>) {
        tokio::spawn(async move {
            tracing::info!("Starting Telegram listener...");
            notifier.listen_for_commands().await;
            tracing::info!("Telegram listener ended.");
        });
    }
}

#[async_trait::async_trait]
impl Publisher for TelegramNotifier {
    async fn publish(&self, feed: &FeedConfig, entries: &PublishMap) -> Result<(), NotifyError> {
        sender::send_publish_map(self, feed, entries).await
    }
}
