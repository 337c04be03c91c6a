// Filter & slug pipeline: narrows fetched offers and maps them to the publish payload.

pub mod predicates;
pub mod publish;
pub mod slug;

pub use predicates::{filter_all, standard_predicates};
pub use publish::{to_publish_map, PublishMap};
pub use slug::build_slug;
