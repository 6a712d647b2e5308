use async_trait::async_trait;

use crate::error::Result;
use crate::feed::Article;

/// Source of fresh articles for a feed, consulted by the cache on a miss or
/// after an entry expires.
///
/// Implementations own their timeout policy and must report a timeout as an
/// error instead of hanging.
#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    /// Retrieve and normalize every article currently published at `url`,
    /// in feed order.
    async fn fetch_articles(&self, url: &str) -> Result<Vec<Article>>;
}
