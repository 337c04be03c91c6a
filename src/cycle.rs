// One fetch → filter → publish → mirror run for a single feed
use crate::config::{AppConfig, FeedConfig};
use crate::filter::{filter_all, standard_predicates, to_publish_map};
use crate::model::{NotifyError, ParserError, ScraperError, StorageError};
use crate::notifier::Publisher;
use crate::parser::Parser;
use crate::scraper::Fetcher;
use crate::storage::SqliteStorage;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Debug, Clone)]
pub struct CycleSettings {
    pub fresh_window: Duration,
    pub discount_ceiling: u8,
    pub skip_unchanged: bool,
}

impl From<&AppConfig> for CycleSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            fresh_window: Duration::hours(config.fresh_window_hours),
            discount_ceiling: config.discount_ceiling,
            skip_unchanged: config.skip_unchanged,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    NothingNew,
    /// Same entries as the mirror already holds; notification skipped.
    Unchanged(usize),
    Published(usize),
}

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] ScraperError),
    #[error("parse failed: {0}")]
    Parse(#[from] ParserError),
    #[error("notification failed: {0}")]
    Notify(#[from] NotifyError),
    #[error("mirror failed: {0}")]
    Storage(#[from] StorageError),
}

pub async fn run_cycle(
    feed: &FeedConfig,
    fetcher: &dyn Fetcher,
    parser: &dyn Parser,
    publisher: &dyn Publisher,
    storage: &Mutex<SqliteStorage>,
    settings: &CycleSettings,
    now: DateTime<Utc>,
) -> Result<CycleOutcome, CycleError> {
    info!("[{}] Fetching catalog...", feed.name);
    let body = fetcher.fetch(feed).await?;
    let offers = parser.parse(&body)?;
    let fetched = offers.len();

    let predicates = standard_predicates(now, settings.fresh_window, settings.discount_ceiling);
    let survivors = filter_all(offers, &predicates);
    info!("[{}] {} of {} offers are new free games", feed.name, survivors.len(), fetched);

    if survivors.is_empty() {
        info!("[{}] no new game available", feed.name);
        return Ok(CycleOutcome::NothingNew);
    }

    let entries = to_publish_map(&survivors);
    let previous = storage.lock().await.load_mirror(&feed.name)?;

    if settings.skip_unchanged && previous.is_some_and(|p| p.entries == entries) {
        info!("[{}] publish map unchanged, skipping notification", feed.name);
        storage.lock().await.replace_mirror(&feed.name, &entries, now)?;
        return Ok(CycleOutcome::Unchanged(entries.len()));
    }

    publisher.publish(feed, &entries).await?;
    storage.lock().await.replace_mirror(&feed.name, &entries, now)?;
    info!("[{}] published {} entries", feed.name, entries.len());

    Ok(CycleOutcome::Published(entries.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PublishMap;
    use crate::parser::CatalogParser;
    use chrono::TimeZone;
    use std::sync::Mutex as StdMutex;

    struct StaticFetcher(String);

    #[async_trait::async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, _feed: &FeedConfig) -> Result<String, ScraperError> {
            Ok(self.0.clone())
        }
    }

    struct FailingFetcher;

    #[async_trait::async_trait]
    impl Fetcher for FailingFetcher {
        async fn fetch(&self, _feed: &FeedConfig) -> Result<String, ScraperError> {
            Err(ScraperError::Status(503))
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        sent: StdMutex<Vec<PublishMap>>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Publisher for RecordingPublisher {
        async fn publish(&self, _feed: &FeedConfig, entries: &PublishMap) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Unreachable);
            }
            self.sent.lock().unwrap().push(entries.clone());
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
    }

    fn feed() -> FeedConfig {
        FeedConfig {
            name: "free_games_us".into(),
            locale: "en-US".into(),
            country: "US".into(),
            store_base_url: "https://store.epicgames.com/en-US".into(),
        }
    }

    fn settings() -> CycleSettings {
        CycleSettings {
            fresh_window: Duration::hours(24),
            discount_ceiling: 10,
            skip_unchanged: true,
        }
    }

    fn storage() -> Mutex<SqliteStorage> {
        Mutex::new(SqliteStorage::new(":memory:").unwrap())
    }

    /// One free game that started two hours before `now()` and one at half price.
    const CATALOG: &str = r#"{ "data": { "Catalog": { "searchStore": { "elements": [
        { "title": "Free: The Game", "productSlug": "free-the-game/home", "urlSlug": "ftg",
          "offerType": "BASE_GAME", "categories": [ { "path": "freegames" } ],
          "catalogNs": { "mappings": [] }, "offerMappings": [],
          "promotions": { "promotionalOffers": [ { "promotionalOffers": [
            { "startDate": "2024-05-20T10:00:00.000Z", "endDate": "2024-05-27T10:00:00.000Z",
              "discountSetting": { "discountPercentage": 0 } } ] } ] } },
        { "title": "Half Price", "productSlug": "half-price", "offerType": "BASE_GAME",
          "promotions": { "promotionalOffers": [ { "promotionalOffers": [
            { "startDate": "2024-05-20T10:00:00.000Z", "endDate": "2024-05-27T10:00:00.000Z",
              "discountSetting": { "discountPercentage": 50 } } ] } ] } }
    ] } } } }"#;

    const EMPTY_CATALOG: &str =
        r#"{ "data": { "Catalog": { "searchStore": { "elements": [] } } } }"#;

    #[tokio::test]
    async fn publishes_only_the_free_offer_and_mirrors_it() {
        let publisher = RecordingPublisher::default();
        let storage = storage();

        let outcome = run_cycle(
            &feed(),
            &StaticFetcher(CATALOG.into()),
            &CatalogParser::new(),
            &publisher,
            &storage,
            &settings(),
            now(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, CycleOutcome::Published(1));
        let sent = publisher.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["Free The Game"], "/p/free-the-game");

        let mirror = storage.lock().await.load_mirror("free_games_us").unwrap().unwrap();
        assert_eq!(mirror.entries, sent[0]);
        assert_eq!(mirror.updated_at, now());
    }

    #[tokio::test]
    async fn unchanged_map_is_not_sent_twice() {
        let publisher = RecordingPublisher::default();
        let storage = storage();
        let fetcher = StaticFetcher(CATALOG.into());
        let parser = CatalogParser::new();

        let first = run_cycle(&feed(), &fetcher, &parser, &publisher, &storage, &settings(), now())
            .await
            .unwrap();
        let later = now() + Duration::hours(1);
        let second = run_cycle(&feed(), &fetcher, &parser, &publisher, &storage, &settings(), later)
            .await
            .unwrap();

        assert_eq!(first, CycleOutcome::Published(1));
        assert_eq!(second, CycleOutcome::Unchanged(1));
        assert_eq!(publisher.sent.lock().unwrap().len(), 1);
        let mirror = storage.lock().await.load_mirror("free_games_us").unwrap().unwrap();
        assert_eq!(mirror.updated_at, later);
    }

    #[tokio::test]
    async fn unchanged_map_is_resent_when_suppression_is_off() {
        let publisher = RecordingPublisher::default();
        let storage = storage();
        let fetcher = StaticFetcher(CATALOG.into());
        let parser = CatalogParser::new();
        let settings = CycleSettings {
            skip_unchanged: false,
            ..settings()
        };

        for _ in 0..2 {
            run_cycle(&feed(), &fetcher, &parser, &publisher, &storage, &settings, now())
                .await
                .unwrap();
        }
        assert_eq!(publisher.sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn nothing_new_touches_neither_notifier_nor_mirror() {
        let publisher = RecordingPublisher::default();
        let storage = storage();

        let outcome = run_cycle(
            &feed(),
            &StaticFetcher(EMPTY_CATALOG.into()),
            &CatalogParser::new(),
            &publisher,
            &storage,
            &settings(),
            now(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, CycleOutcome::NothingNew);
        assert!(publisher.sent.lock().unwrap().is_empty());
        assert!(storage.lock().await.load_mirror("free_games_us").unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_notification_leaves_mirror_untouched() {
        let publisher = RecordingPublisher {
            fail: true,
            ..Default::default()
        };
        let storage = storage();

        let err = run_cycle(
            &feed(),
            &StaticFetcher(CATALOG.into()),
            &CatalogParser::new(),
            &publisher,
            &storage,
            &settings(),
            now(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CycleError::Notify(NotifyError::Unreachable)));
        assert!(storage.lock().await.load_mirror("free_games_us").unwrap().is_none());
    }

    #[tokio::test]
    async fn fetch_failure_fails_the_cycle() {
        let err = run_cycle(
            &feed(),
            &FailingFetcher,
            &CatalogParser::new(),
            &RecordingPublisher::default(),
            &storage(),
            &settings(),
            now(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, CycleError::Fetch(ScraperError::Status(503))));
    }
}
