// Core structs: Offer, PromotionWindow, OfferKind and the crate errors
use crate::utils::{first_path_segment, sanitize_key};
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Key used when a title sanitizes down to nothing.
pub const TITLE_PLACEHOLDER: &str = "placeholder";

/// Category path that forces an offer to be treated as a bundle.
pub const BUNDLES_CATEGORY: &str = "bundles";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferKind {
    Bundle,
    BaseGame,
    AddOn,
    Others,
    Unknown(String),
}

impl OfferKind {
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "BUNDLE" => OfferKind::Bundle,
            "BASE_GAME" => OfferKind::BaseGame,
            "ADD_ON" => OfferKind::AddOn,
            "OTHERS" => OfferKind::Others,
            other => OfferKind::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            OfferKind::Bundle => "BUNDLE",
            OfferKind::BaseGame => "BASE_GAME",
            OfferKind::AddOn => "ADD_ON",
            OfferKind::Others => "OTHERS",
            OfferKind::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for OfferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub path: String,
}

/// Alternate slug keyed by the storefront page type (`productHome`, `offer`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMapping {
    pub page_slug: String,
    pub page_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionWindow {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub discount_percentage: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionGroup {
    pub offers: Vec<PromotionWindow>,
}

/// One catalog entry as delivered by the storefront feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub title: String,
    pub product_slug: String,
    pub url_slug: String,
    pub offer_type: OfferKind,
    pub categories: Vec<Category>,
    pub catalog_mappings: Vec<PageMapping>,
    pub offer_mappings: Vec<PageMapping>,
    pub promotion_schedule: Vec<PromotionGroup>,
}

impl Offer {
    /// All promotion windows of every group, in feed order.
    pub fn windows(&self) -> impl Iterator<Item = &PromotionWindow> {
        self.promotion_schedule.iter().flat_map(|group| group.offers.iter())
    }

    /// True if some window strictly contains `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.windows()
            .any(|w| w.start_date < now && now < w.end_date)
    }

    pub fn has_window_starting_after(&self, threshold: DateTime<Utc>) -> bool {
        self.windows().any(|w| w.start_date > threshold)
    }

    pub fn has_discount_at_most(&self, ceiling: u8) -> bool {
        self.windows().any(|w| w.discount_percentage <= ceiling)
    }

    pub fn is_in_category(&self, path: &str) -> bool {
        self.categories.iter().any(|c| c.path == path)
    }

    /// Storefront page segment for this offer.
    ///
    /// Add-ons only ever use their `offer` mapping. Everything else takes the
    /// first of the `productHome` mapping, `productSlug` and `urlSlug` that is
    /// still non-empty once cut at the first `/`.
    pub fn resolve_slug(&self) -> String {
        if self.offer_type == OfferKind::AddOn {
            return find_page_slug(&self.offer_mappings, "offer")
                .unwrap_or_default()
                .to_string();
        }

        let home = find_page_slug(&self.catalog_mappings, "productHome").unwrap_or_default();

        [home, self.product_slug.as_str(), self.url_slug.as_str()]
            .into_iter()
            .map(first_path_segment)
            .find(|segment| !segment.is_empty())
            .unwrap_or_default()
            .to_string()
    }

    /// Title usable as a flat payload key; never empty.
    pub fn display_title(&self) -> String {
        let cleaned = sanitize_key(&self.title);
        if cleaned.is_empty() {
            TITLE_PLACEHOLDER.to_string()
        } else {
            cleaned
        }
    }

    pub fn effective_offer_type(&self) -> OfferKind {
        if self.is_in_category(BUNDLES_CATEGORY) {
            OfferKind::Bundle
        } else {
            self.offer_type.clone()
        }
    }
}

fn find_page_slug<'a>(mappings: &'a [PageMapping], page_type: &str) -> Option<&'a str> {
    mappings
        .iter()
        .find(|m| m.page_type == page_type)
        .map(|m| m.page_slug.as_str())
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("request timed out")]
    Timeout,
}

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("malformed catalog json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("payload serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(#[from] chrono::ParseError),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api responded {status}: {body}")]
    Api { status: u16, body: String },
    #[error("notification endpoint unreachable")]
    Unreachable,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use chrono::Duration;

    pub fn window(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        discount_percentage: u8,
    ) -> PromotionWindow {
        PromotionWindow {
            start_date: start,
            end_date: end,
            discount_percentage,
        }
    }

    pub fn offer(title: &str) -> Offer {
        Offer {
            title: title.to_string(),
            product_slug: String::new(),
            url_slug: String::new(),
            offer_type: OfferKind::BaseGame,
            categories: Vec::new(),
            catalog_mappings: Vec::new(),
            offer_mappings: Vec::new(),
            promotion_schedule: Vec::new(),
        }
    }

    /// Free offer whose single window started `started_hours_ago` and lasts a week.
    pub fn free_offer(title: &str, now: DateTime<Utc>, started_hours_ago: i64) -> Offer {
        let start = now - Duration::hours(started_hours_ago);
        let mut o = offer(title);
        o.product_slug = title.to_lowercase().replace(' ', "-");
        o.promotion_schedule = vec![PromotionGroup {
            offers: vec![window(start, start + Duration::days(7), 0)],
        }];
        o
    }

    pub fn mapping(page_slug: &str, page_type: &str) -> PageMapping {
        PageMapping {
            page_slug: page_slug.to_string(),
            page_type: page_type.to_string(),
        }
    }
}
