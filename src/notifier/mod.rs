pub mod telegram;

use crate::config::FeedConfig;
use crate::filter::PublishMap;
use crate::model::NotifyError;

pub use telegram::TelegramNotifier;

/// Delivers a publish map to subscribers.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, feed: &FeedConfig, entries: &PublishMap) -> Result<(), NotifyError>;
}
