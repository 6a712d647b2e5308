pub mod cache;
pub mod filter;
pub mod persistent_cache;
pub mod traits;

pub use cache::{Cache, CacheEntry, CacheStats};
pub use filter::filter_articles;
pub use persistent_cache::{PersistentCache, PersistentCacheData, CACHE_VERSION};
pub use traits::ArticleFetcher;
