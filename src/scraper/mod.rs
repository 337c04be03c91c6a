mod fetcher;
mod traits;

pub use fetcher::CatalogFetcher;
pub use traits::Fetcher;
