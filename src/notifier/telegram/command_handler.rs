// notifier/telegram/command_handler.rs

use crate::notifier::telegram::TelegramNotifier;
use crate::storage::MirrorRecord;
use std::time::Duration;
use tracing::{info, warn};

const HELP: &str = "📋 Available commands:\n\
    /ping — check connection\n\
    /help — command list\n\
    /last — last published free games\n\
    /refresh — check the feeds now\n\
    /uptime — service uptime";

/// Handles an incoming command and triggers the corresponding action.
pub async fn handle_command(command_text: &str, notifier: &TelegramNotifier) {
    info!("Handling command: {}", command_text);
    let command = command_text.split_whitespace().next().unwrap_or_default();
    let reply = match command {
        "/ping" => "✅ I am online!".to_string(),
        "/help" => HELP.to_string(),
        "/refresh" => {
            notifier.refresh_notify.notify_one();
            "🔄 Feed check triggered.".to_string()
        }
        "/uptime" => format_uptime(notifier.start_time.elapsed()),
        "/last" => match notifier.storage.lock().await.all_mirrors() {
            Ok(records) => format_mirrors(&records),
            Err(e) => format!("❌ Error: {}", e),
        },
        _ => "🤖 Unknown command. Try /help".to_string(),
    };
    if let Err(e) = notifier.notify_text(&reply).await {
        warn!("{} reply error: {:?}", command, e);
    }
}

pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!(
        "⏱ Uptime: {:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

pub fn format_mirrors(records: &[MirrorRecord]) -> String {
    if records.is_empty() {
        return "📭 Nothing published yet.".to_string();
    }
    let mut msg = String::new();
    for record in records {
        msg.push_str(&format!(
            "🗂 {} (updated {})\n",
            record.name,
            record.updated_at.format("%Y-%m-%d %H:%M UTC")
        ));
        for (title, slug) in &record.entries {
            msg.push_str(&format!("• {} — {}\n", title, slug));
        }
    }
    msg
}
