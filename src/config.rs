use crate::model::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const FEED_ENDPOINT: &str = "https://store-site-backend-static.ak.epicgames.com/freeGamesPromotions";

/// One storefront variant (locale/country pair) to poll.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Also the name of the persisted mirror location.
    pub name: String,
    pub locale: String,
    pub country: String,
    pub store_base_url: String,
}

impl FeedConfig {
    pub fn request_url(&self) -> String {
        format!(
            "{}?locale={}&country={}&allowCountries={}",
            FEED_ENDPOINT, self.locale, self.country, self.country
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub telegram_chat_id: i64,
    pub feeds: Vec<FeedConfig>,
    pub check_interval_seconds: u64,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_fresh_window")]
    pub fresh_window_hours: i64,
    #[serde(default = "default_discount_ceiling")]
    pub discount_ceiling: u8,
    #[serde(default = "default_skip_unchanged")]
    pub skip_unchanged: bool,
}

fn default_db_path() -> String {
    "data.db".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_fresh_window() -> i64 {
    24
}

fn default_discount_ceiling() -> u8 {
    10
}

fn default_skip_unchanged() -> bool {
    true
}

pub fn load_config(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
