use crate::config::FeedConfig;
use crate::model::ScraperError;

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Returns the raw catalog document for one storefront variant.
    async fn fetch(&self, feed: &FeedConfig) -> Result<String, ScraperError>;
}
