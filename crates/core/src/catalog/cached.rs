//! Catalog reads behind the TTL cache.

use std::sync::Arc;

use crate::anime::{AnimeRecord, CatalogReview, RankingKind};
use crate::cache::{CacheKey, CacheStats, Clock, SystemClock, TtlCache};
use crate::config::CacheConfig;

use super::{AnimeCatalog, CatalogError, MAX_RANKING_LIMIT, MAX_REVIEWS_LIMIT, MAX_SEARCH_LIMIT};

/// A catalog client with read-through caches for listings, details and
/// catalog reviews.
///
/// Failed fetches are never cached; the next call for the same request goes
/// back to the catalog. Limits are clamped to what the catalog serves before
/// the key is built, so requests the catalog answers identically share an
/// entry.
pub struct CachedCatalog {
    inner: Arc<dyn AnimeCatalog>,
    lists: TtlCache<Arc<Vec<AnimeRecord>>>,
    details: TtlCache<Arc<AnimeRecord>>,
    reviews: TtlCache<Arc<Vec<CatalogReview>>>,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn AnimeCatalog>, config: &CacheConfig) -> Self {
        Self::with_clock(inner, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        inner: Arc<dyn AnimeCatalog>,
        config: &CacheConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner,
            lists: TtlCache::with_clock("lists", config.ttl(), clock.clone())
                .with_max_entries(config.max_entries),
            details: TtlCache::with_clock("details", config.ttl(), clock.clone())
                .with_max_entries(config.max_entries),
            reviews: TtlCache::with_clock("reviews", config.ttl(), clock)
                .with_max_entries(config.max_entries),
        }
    }

    /// Title search, cached under the normalized query.
    pub async fn search(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Arc<Vec<AnimeRecord>>, CatalogError> {
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT);
        self.lists
            .get_or_fetch(CacheKey::search(query, limit), move || async move {
                self.inner.search(query.trim(), limit).await.map(Arc::new)
            })
            .await
    }

    /// Ranking listing.
    pub async fn ranking(
        &self,
        kind: RankingKind,
        limit: u32,
    ) -> Result<Arc<Vec<AnimeRecord>>, CatalogError> {
        let limit = limit.clamp(1, MAX_RANKING_LIMIT);
        self.lists
            .get_or_fetch(CacheKey::ranking(kind, limit), move || async move {
                self.inner.get_ranking(kind, limit).await.map(Arc::new)
            })
            .await
    }

    /// Full details for one anime.
    pub async fn details(&self, id: u64) -> Result<Arc<AnimeRecord>, CatalogError> {
        self.details
            .get_or_fetch(CacheKey::details(id), move || async move {
                self.inner.get_details(id).await.map(Arc::new)
            })
            .await
    }

    /// Most helpful catalog reviews for one anime.
    pub async fn top_reviews(
        &self,
        id: u64,
        limit: u32,
    ) -> Result<Arc<Vec<CatalogReview>>, CatalogError> {
        let limit = limit.clamp(1, MAX_REVIEWS_LIMIT);
        self.reviews
            .get_or_fetch(CacheKey::reviews(id, limit), move || async move {
                self.inner.get_top_reviews(id, limit).await.map(Arc::new)
            })
            .await
    }

    /// Drop the cached details of one anime. Returns whether an entry was
    /// present.
    pub fn invalidate_details(&self, id: u64) -> bool {
        self.details.invalidate(&CacheKey::details(id))
    }

    /// Drop every cached response, returning how many entries went.
    pub fn clear(&self) -> usize {
        self.lists.clear() + self.details.clear() + self.reviews.clear()
    }

    /// Drop only entries past their TTL.
    pub fn purge_expired(&self) -> usize {
        self.lists.purge_expired() + self.details.purge_expired() + self.reviews.purge_expired()
    }

    pub fn stats(&self) -> Vec<CacheStats> {
        vec![
            self.lists.stats(),
            self.details.stats(),
            self.reviews.stats(),
        ]
    }
}
