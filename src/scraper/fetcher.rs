use crate::config::FeedConfig;
use crate::model::ScraperError;
use crate::scraper::Fetcher;

use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

pub struct CatalogFetcher {
    pub client: Client,
    pub deadline: Duration,
}

impl CatalogFetcher {
    pub fn new(deadline: Duration) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) FreebieSniperBot/0.1")
            .build()?;

        Ok(Self { client, deadline })
    }
}

#[async_trait::async_trait]
impl Fetcher for CatalogFetcher {
    async fn fetch(&self, feed: &FeedConfig) -> Result<String, ScraperError> {
        let url = feed.request_url();
        debug!("GET {}", url);

        let request = async {
            let response = self.client.get(&url).send().await?;
            let status = response.status();
            if !status.is_success() {
                return Err(ScraperError::Status(status.as_u16()));
            }
            Ok::<_, ScraperError>(response.text().await?)
        };

        match timeout(self.deadline, request).await {
            Ok(result) => result,
            Err(_) => Err(ScraperError::Timeout),
        }
    }
}
