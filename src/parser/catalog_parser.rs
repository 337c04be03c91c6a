// Storefront catalog JSON decoding
use crate::model::{
    Category, Offer, OfferKind, PageMapping, ParserError, PromotionGroup, PromotionWindow,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Discount assumed for a window without a discount setting; never counts as free.
const UNKNOWN_DISCOUNT: u8 = 100;

pub trait Parser {
    fn parse(&self, body: &str) -> Result<Vec<Offer>, ParserError>;
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    data: Option<CatalogData>,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    #[serde(rename = "Catalog")]
    catalog: Option<CatalogSection>,
}

#[derive(Debug, Deserialize)]
struct CatalogSection {
    #[serde(rename = "searchStore")]
    search_store: Option<SearchStore>,
}

#[derive(Debug, Deserialize)]
struct SearchStore {
    elements: Option<Vec<RawElement>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawElement {
    title: Option<String>,
    product_slug: Option<String>,
    url_slug: Option<String>,
    offer_type: Option<String>,
    categories: Option<Vec<RawCategory>>,
    catalog_ns: Option<RawCatalogNs>,
    offer_mappings: Option<Vec<RawMapping>>,
    promotions: Option<RawPromotions>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawCatalogNs {
    mappings: Option<Vec<RawMapping>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMapping {
    page_slug: Option<String>,
    page_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPromotions {
    promotional_offers: Option<Vec<RawPromotionGroup>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPromotionGroup {
    promotional_offers: Option<Vec<RawWindow>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWindow {
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    discount_setting: Option<RawDiscountSetting>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDiscountSetting {
    discount_percentage: Option<u8>,
}

impl From<RawMapping> for PageMapping {
    fn from(raw: RawMapping) -> Self {
        Self {
            page_slug: raw.page_slug.unwrap_or_default(),
            page_type: raw.page_type.unwrap_or_default(),
        }
    }
}

impl From<RawWindow> for PromotionWindow {
    fn from(raw: RawWindow) -> Self {
        Self {
            start_date: raw.start_date,
            end_date: raw.end_date,
            discount_percentage: raw
                .discount_setting
                .and_then(|d| d.discount_percentage)
                .unwrap_or(UNKNOWN_DISCOUNT),
        }
    }
}

impl From<RawElement> for Offer {
    fn from(raw: RawElement) -> Self {
        let promotion_schedule = raw
            .promotions
            .and_then(|p| p.promotional_offers)
            .unwrap_or_default()
            .into_iter()
            .map(|group| PromotionGroup {
                offers: group
                    .promotional_offers
                    .unwrap_or_default()
                    .into_iter()
                    .map(PromotionWindow::from)
                    .collect(),
            })
            .collect();

        Self {
            title: raw.title.unwrap_or_default(),
            product_slug: raw.product_slug.unwrap_or_default(),
            url_slug: raw.url_slug.unwrap_or_default(),
            offer_type: OfferKind::from_raw(raw.offer_type.as_deref().unwrap_or_default()),
            categories: raw
                .categories
                .unwrap_or_default()
                .into_iter()
                .map(|c| Category { path: c.path.unwrap_or_default() })
                .collect(),
            catalog_mappings: raw
                .catalog_ns
                .and_then(|ns| ns.mappings)
                .unwrap_or_default()
                .into_iter()
                .map(PageMapping::from)
                .collect(),
            offer_mappings: raw
                .offer_mappings
                .unwrap_or_default()
                .into_iter()
                .map(PageMapping::from)
                .collect(),
            promotion_schedule,
        }
    }
}

pub struct CatalogParser;

impl CatalogParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for CatalogParser {
    fn parse(&self, body: &str) -> Result<Vec<Offer>, ParserError> {
        let response: CatalogResponse = serde_json::from_str(body)?;

        let elements = response
            .data
            .and_then(|d| d.catalog)
            .and_then(|c| c.search_store)
            .and_then(|s| s.elements)
            .ok_or_else(|| ParserError::MissingField("data.Catalog.searchStore.elements".into()))?;

        Ok(elements.into_iter().map(Offer::from).collect())
    }
}
