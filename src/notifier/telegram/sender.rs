// notifier/telegram/sender.rs

use crate::config::FeedConfig;
use crate::filter::PublishMap;
use crate::model::NotifyError;
use crate::notifier::telegram::TelegramNotifier;
use reqwest::{Response, StatusCode};
use tokio::time::timeout;
use tracing::{info, warn};

/// Sends a simple text message via Telegram.
pub async fn send_text(notifier: &TelegramNotifier, text: &str) -> Result<(), NotifyError> {
    let params = [
        ("chat_id", notifier.chat_id.to_string()),
        ("text", text.to_string()),
    ];
    let response = match timeout(
        notifier.deadline,
        notifier
            .client
            .post(notifier.api_url("sendMessage"))
            .form(&params)
            .send(),
    )
    .await
    {
        Ok(Ok(resp)) => resp,
        Ok(Err(e)) => {
            warn!("Telegram send() failed: {:?}", e);
            return Err(NotifyError::Http(e));
        }
        Err(_) => {
            warn!("Telegram send() timed out");
            return Err(NotifyError::Unreachable);
        }
    };
    ensure_success(response).await?;
    info!("Telegram message sent");
    Ok(())
}

/// Turns a non-2xx Bot API reply into `NotifyError::Api`.
pub async fn ensure_success(response: Response) -> Result<(), NotifyError> {
    let status = response.status();
    let body = response.text().await.unwrap_or_else(|_| "unknown".into());
    check_status(status, body)
}

fn check_status(status: StatusCode, body: String) -> Result<(), NotifyError> {
    if status.is_success() {
        return Ok(());
    }
    warn!("Telegram API responded [{}]: {}", status, body);
    Err(NotifyError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Sends the publish map of one feed as a single message.
pub async fn send_publish_map(
    notifier: &TelegramNotifier,
    feed: &FeedConfig,
    entries: &PublishMap,
) -> Result<(), NotifyError> {
    let message = format_publish_message(feed, entries);
    info!("Sending Telegram message:\n{}", message);
    send_text(notifier, &message).await
}

pub fn format_publish_message(feed: &FeedConfig, entries: &PublishMap) -> String {
    let noun = if entries.len() == 1 { "game" } else { "games" };
    let mut message = format!("🎁 {} new {} available ({})\n", entries.len(), noun, feed.name);
    for (title, slug) in entries {
        message.push_str(&format!(
            "\n• {} → {}{}",
            title,
            feed.store_base_url.trim_end_matches('/'),
            slug
        ));
    }
    message
}
