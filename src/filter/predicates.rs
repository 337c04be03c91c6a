use crate::model::Offer;
use chrono::{DateTime, Duration, Utc};

/// A single acceptance rule over one offer.
pub type OfferPredicate = Box<dyn Fn(&Offer) -> bool + Send + Sync>;

/// Offer has a promotion window running at `now`.
pub fn active_at(now: DateTime<Utc>) -> OfferPredicate {
    Box::new(move |offer| offer.is_active_at(now))
}

/// Offer has a promotion window that began within `window` before `now`.
pub fn started_within(now: DateTime<Utc>, window: Duration) -> OfferPredicate {
    let threshold = now - window;
    Box::new(move |offer| offer.has_window_starting_after(threshold))
}

pub fn discount_at_most(ceiling: u8) -> OfferPredicate {
    Box::new(move |offer| offer.has_discount_at_most(ceiling))
}

/// Active now, started within `fresh_window` and at most `ceiling` percent.
pub fn standard_predicates(
    now: DateTime<Utc>,
    fresh_window: Duration,
    ceiling: u8,
) -> Vec<OfferPredicate> {
    vec![
        active_at(now),
        started_within(now, fresh_window),
        discount_at_most(ceiling),
    ]
}

/// Keeps offers accepted by every predicate, in input order.
pub fn filter_all(offers: Vec<Offer>, predicates: &[OfferPredicate]) -> Vec<Offer> {
    offers
        .into_iter()
        .filter(|offer| predicates.iter().all(|accept| accept(offer)))
        .collect()
}
