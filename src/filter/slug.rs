use crate::model::OfferKind;
use tracing::warn;

/// Storefront path prefix chosen for an offer kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlugPrefix {
    Bundles,
    Product,
    /// Kind not known to the storefront routing; served under the product prefix.
    Fallback(String),
}

impl SlugPrefix {
    pub fn for_kind(kind: &OfferKind) -> Self {
        match kind {
            OfferKind::Bundle => SlugPrefix::Bundles,
            OfferKind::Others | OfferKind::BaseGame | OfferKind::AddOn => SlugPrefix::Product,
            OfferKind::Unknown(raw) => SlugPrefix::Fallback(raw.clone()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlugPrefix::Bundles => "bundles",
            SlugPrefix::Product | SlugPrefix::Fallback(_) => "p",
        }
    }
}

/// Builds `/<prefix>/<page_segment>` for the given effective offer kind.
pub fn build_slug(page_segment: &str, kind: &OfferKind) -> String {
    let prefix = SlugPrefix::for_kind(kind);
    if let SlugPrefix::Fallback(raw) = &prefix {
        warn!(
            offer_type = %raw,
            page = %page_segment,
            "unrecognized offer type, falling back to product path"
        );
    }
    format!("/{}/{}", prefix.as_str(), page_segment)
}
