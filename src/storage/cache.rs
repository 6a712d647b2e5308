use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{Config, DEFAULT_CACHE_DURATION_SECS};
use crate::error::{Error, Result};
use crate::feed::{Article, Feed};
use crate::storage::filter::filter_articles;
use crate::storage::persistent_cache::PersistentCache;
use crate::storage::traits::ArticleFetcher;

/// Articles fetched for one feed together with the moment they go stale.
///
/// Entries are replaced as a whole; `expire` always belongs to the
/// `articles` stored next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub articles: Vec<Article>,
    pub expire: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(articles: Vec<Article>, ttl: Duration) -> Self {
        Self {
            articles,
            expire: Utc::now() + ttl,
        }
    }

    /// An entry is served only while `expire` lies strictly after `now`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        self.expire > now
    }

    pub fn is_expired(&self) -> bool {
        !self.is_fresh_at(Utc::now())
    }
}

/// Counters describing how lookups were served.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub refreshes: u64,
    pub fetch_failures: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Per-feed article cache.
///
/// Lookups are served from memory while an entry is fresh; a missing or
/// expired entry triggers a fetch. The mutex only guards map access, so a
/// slow fetch for one feed never blocks lookups for another. Two concurrent
/// refreshes of the same feed both fetch and the last one to finish wins.
pub struct Cache {
    content: Mutex<HashMap<String, CacheEntry>>,
    stats: Mutex<CacheStats>,
    persistence: PersistentCache,
    fetcher: Arc<dyn ArticleFetcher>,
    cache_duration: Duration,
}

impl Cache {
    pub fn new(path: impl Into<PathBuf>, fetcher: Arc<dyn ArticleFetcher>) -> Self {
        Self {
            content: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::default()),
            persistence: PersistentCache::new(path),
            fetcher,
            cache_duration: Duration::seconds(DEFAULT_CACHE_DURATION_SECS as i64),
        }
    }

    /// A cache stored in the platform cache directory.
    pub fn with_default_path(fetcher: Arc<dyn ArticleFetcher>) -> Result<Self> {
        Ok(Self::new(Config::default().cache_path()?, fetcher))
    }

    pub fn with_cache_duration(mut self, cache_duration: Duration) -> Self {
        self.cache_duration = cache_duration;
        self
    }

    pub fn storage_path(&self) -> &Path {
        self.persistence.cache_path()
    }

    pub fn cache_duration(&self) -> Duration {
        self.cache_duration
    }

    /// Restore entries from the cache file.
    ///
    /// A missing file leaves the cache untouched; an unreadable or corrupt
    /// file is reported and nothing is restored.
    pub fn load(&self) -> Result<()> {
        let entries = self.persistence.load()?;
        let restored = entries.len();

        let mut content = self.content.lock();
        content.extend(entries);
        info!("Restored {} cached feeds ({} total)", restored, content.len());
        Ok(())
    }

    /// Write every entry to the cache file, replacing its previous content.
    /// In-memory state is kept whether or not the write succeeds.
    pub fn save(&self) -> Result<()> {
        let content = self.content.lock();
        self.persistence.save(&content)
    }

    /// Articles for `feed`, served from the cache while fresh and fetched
    /// otherwise.
    ///
    /// With `apply_filters` set, the feed's whitelist and blacklist are
    /// applied to the returned articles. The cached entry always keeps the
    /// unfiltered articles. A failed fetch is returned as [`Error::Fetch`]
    /// and leaves any existing entry for the feed in place.
    pub async fn get_articles(&self, feed: &Feed, apply_filters: bool) -> Result<Vec<Article>> {
        let articles = match self.lookup(&feed.url) {
            Some(articles) => articles,
            None => self.refresh(&feed.url).await?,
        };

        if apply_filters && feed.has_filters() {
            let filtered = filter_articles(&articles, &feed.whitelist_words, &feed.blacklist_words);
            debug!(
                "Filters kept {} of {} articles for {}",
                filtered.len(),
                articles.len(),
                feed.url
            );
            return Ok(filtered);
        }

        Ok(articles)
    }

    fn lookup(&self, url: &str) -> Option<Vec<Article>> {
        let now = Utc::now();
        let cached = {
            let content = self.content.lock();
            content
                .get(url)
                .map(|entry| entry.is_fresh_at(now).then(|| entry.articles.clone()))
        };

        let mut stats = self.stats.lock();
        match cached {
            Some(Some(articles)) => {
                stats.hits += 1;
                debug!("Cache hit for {}", url);
                Some(articles)
            }
            Some(None) => {
                stats.misses += 1;
                stats.expirations += 1;
                debug!("Cache entry for {} expired", url);
                None
            }
            None => {
                stats.misses += 1;
                debug!("Cache miss for {}", url);
                None
            }
        }
    }

    async fn refresh(&self, url: &str) -> Result<Vec<Article>> {
        // the lock is not held while fetching
        let fetched = match self.fetcher.fetch_articles(url).await {
            Ok(articles) => articles,
            Err(e) => {
                self.stats.lock().fetch_failures += 1;
                warn!("Failed to fetch {}, keeping cached entry if any: {}", url, e);
                return Err(Error::fetch(format!("Failed to fetch articles for {}", url), e));
            }
        };

        let entry = CacheEntry::new(fetched.clone(), self.cache_duration);
        debug!("Caching {} articles for {} until {}", fetched.len(), url, entry.expire);
        self.content.lock().insert(url.to_string(), entry);
        self.stats.lock().refreshes += 1;

        Ok(fetched)
    }

    /// Install `entry` for `url`, replacing any previous entry.
    pub fn insert(&self, url: impl Into<String>, entry: CacheEntry) {
        self.content.lock().insert(url.into(), entry);
    }

    pub fn entry(&self, url: &str) -> Option<CacheEntry> {
        self.content.lock().get(url).cloned()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.content.lock().contains_key(url)
    }

    pub fn keys(&self) -> Vec<String> {
        self.content.lock().keys().cloned().collect()
    }

    /// Copy of every entry, for display and tests.
    pub fn snapshot(&self) -> HashMap<String, CacheEntry> {
        self.content.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.content.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.lock().clone()
    }
}
