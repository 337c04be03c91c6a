use crate::filter::build_slug;
use crate::model::Offer;
use std::collections::BTreeMap;
use tracing::debug;

/// Display title → storefront slug, the payload handed to notifier and mirror.
pub type PublishMap = BTreeMap<String, String>;

/// Maps surviving offers to their publish entries.
///
/// Offers that share a display title collapse into one entry; the later offer
/// in iteration order wins.
pub fn to_publish_map(offers: &[Offer]) -> PublishMap {
    let mut map = PublishMap::new();
    for offer in offers {
        let title = offer.display_title();
        let slug = build_slug(&offer.resolve_slug(), &offer.effective_offer_type());
        if let Some(previous) = map.insert(title.clone(), slug) {
            debug!("title '{}' already published as {}, overwritten", title, previous);
        }
    }
    map
}
