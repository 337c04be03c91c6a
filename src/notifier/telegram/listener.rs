// notifier/telegram/listener.rs

use crate::notifier::telegram::command_handler::handle_command;
use crate::notifier::telegram::TelegramNotifier;
use serde::Deserialize;
use std::sync::atomic::Ordering;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

/// Seconds the HTTP client keeps in reserve beyond the long-poll wait.
const POLL_MARGIN_SECS: u64 = 5;

#[derive(Debug, Deserialize)]
struct TelegramApiResponse {
    ok: bool,
    result: Option<Vec<TelegramUpdate>>,
    error_code: Option<i64>,
    description: Option<String>,
}

impl TelegramApiResponse {
    fn into_updates(self) -> Result<Vec<TelegramUpdate>, String> {
        if self.ok {
            Ok(self.result.unwrap_or_default())
        } else {
            Err(format!(
                "[{}] {}",
                self.error_code.unwrap_or_default(),
                self.description.unwrap_or_else(|| "no description".into())
            ))
        }
    }
}

/// Long-poll wait for `getUpdates`, kept below the client deadline.
fn long_poll_timeout(deadline: Duration) -> u64 {
    deadline.as_secs().saturating_sub(POLL_MARGIN_SECS)
}

#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    chat: TelegramChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

/// Polls for Telegram updates and processes commands from the configured chat.
pub async fn listen_for_commands(notifier: &TelegramNotifier) {
    let url = notifier.api_url("getUpdates");
    let poll_timeout = long_poll_timeout(notifier.deadline).to_string();
    loop {
        let current_offset = notifier.offset.load(Ordering::SeqCst);
        let response = notifier
            .client
            .get(&url)
            .query(&[
                ("offset", current_offset.to_string()),
                ("timeout", poll_timeout.clone()),
            ])
            .send()
            .await;
        match response {
            Ok(resp) => match resp
                .json::<TelegramApiResponse>()
                .await
                .map(TelegramApiResponse::into_updates)
            {
                Ok(Ok(updates)) => {
                    for update in updates {
                        if let Some(message) = &update.message {
                            if message.chat.id != notifier.chat_id {
                                debug!("Ignoring message from chat {}", message.chat.id);
                            } else if let Some(text) = message.text.as_deref() {
                                handle_command(text, notifier).await;
                            }
                        }
                        notifier.offset.store(update.update_id + 1, Ordering::SeqCst);
                    }
                }
                Ok(Err(api_error)) => warn!("getUpdates rejected: {}", api_error),
                Err(e) => warn!("Malformed getUpdates response: {:?}", e),
            },
            Err(e) => debug!("getUpdates failed: {:?}", e),
        }
        sleep(Duration::from_secs(1)).await;
    }
}
