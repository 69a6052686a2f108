//! Mock anime catalog for testing.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::anime::{AnimeRecord, CatalogReview, RankingKind};
use crate::cache::normalize_query;
use crate::catalog::{AnimeCatalog, CatalogError};

/// A recorded catalog call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCatalogQuery {
    Search { query: String, limit: u32 },
    Ranking { kind: RankingKind, limit: u32 },
    Details { id: u64 },
    Reviews { id: u64, limit: u32 },
}

/// Mock implementation of the AnimeCatalog trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable search and ranking results
/// - Track calls for assertions (failed calls included)
/// - Simulate failures
///
/// Without explicit results, searches match known anime by title and
/// rankings list known anime by popularity.
#[derive(Clone)]
pub struct MockCatalog {
    /// Known anime by id.
    anime: Arc<RwLock<BTreeMap<u64, AnimeRecord>>>,
    /// Canned search results by normalized query.
    search_results: Arc<RwLock<HashMap<String, Vec<AnimeRecord>>>>,
    /// Canned ranking listings.
    rankings: Arc<RwLock<HashMap<RankingKind, Vec<AnimeRecord>>>>,
    /// Catalog reviews by anime id.
    reviews: Arc<RwLock<HashMap<u64, Vec<CatalogReview>>>>,
    /// Recorded calls.
    queries: Arc<RwLock<Vec<RecordedCatalogQuery>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
    /// If set, every operation fails with a "not configured" error.
    always_fail: Arc<RwLock<bool>>,
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCatalog {
    /// Create a new empty mock catalog.
    pub fn new() -> Self {
        Self {
            anime: Arc::new(RwLock::new(BTreeMap::new())),
            search_results: Arc::new(RwLock::new(HashMap::new())),
            rankings: Arc::new(RwLock::new(HashMap::new())),
            reviews: Arc::new(RwLock::new(HashMap::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            always_fail: Arc::new(RwLock::new(false)),
        }
    }

    // =========================================================================
    // Data Configuration
    // =========================================================================

    /// Add an anime to the pool used for details and default listings.
    pub async fn add_anime(&self, record: AnimeRecord) {
        self.anime.write().await.insert(record.id, record);
    }

    /// Add several anime at once.
    pub async fn add_all(&self, records: Vec<AnimeRecord>) {
        let mut map = self.anime.write().await;
        for record in records {
            map.insert(record.id, record);
        }
    }

    /// Set the exact results returned for a search query.
    pub async fn add_search_results(&self, query: &str, records: Vec<AnimeRecord>) {
        self.search_results
            .write()
            .await
            .insert(normalize_query(query), records);
    }

    /// Set the exact listing returned for a ranking kind.
    pub async fn set_ranking(&self, kind: RankingKind, records: Vec<AnimeRecord>) {
        self.rankings.write().await.insert(kind, records);
    }

    /// Set the catalog reviews returned for an anime. Anime without reviews
    /// answer with an empty list.
    pub async fn set_reviews(&self, id: u64, reviews: Vec<CatalogReview>) {
        self.reviews.write().await.insert(id, reviews);
    }

    // =========================================================================
    // Query Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_queries(&self) -> Vec<RecordedCatalogQuery> {
        self.queries.read().await.clone()
    }

    /// Queries passed to `search`, in call order.
    pub async fn recorded_searches(&self) -> Vec<String> {
        self.queries
            .read()
            .await
            .iter()
            .filter_map(|q| match q {
                RecordedCatalogQuery::Search { query, .. } => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    /// Ranking requests, in call order.
    pub async fn recorded_rankings(&self) -> Vec<(RankingKind, u32)> {
        self.queries
            .read()
            .await
            .iter()
            .filter_map(|q| match q {
                RecordedCatalogQuery::Ranking { kind, limit } => Some((*kind, *limit)),
                _ => None,
            })
            .collect()
    }

    /// Ids passed to `get_details`, in call order.
    pub async fn recorded_details(&self) -> Vec<u64> {
        self.queries
            .read()
            .await
            .iter()
            .filter_map(|q| match q {
                RecordedCatalogQuery::Details { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Review requests as `(id, limit)`, in call order.
    pub async fn recorded_reviews(&self) -> Vec<(u64, u32)> {
        self.queries
            .read()
            .await
            .iter()
            .filter_map(|q| match q {
                RecordedCatalogQuery::Reviews { id, limit } => Some((*id, *limit)),
                _ => None,
            })
            .collect()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.queries.write().await.clear();
    }

    /// Get the number of calls performed.
    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make every operation fail until reset.
    pub async fn set_always_fail(&self, fail: bool) {
        *self.always_fail.write().await = fail;
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    /// Record the call, then take the error it should fail with, if any.
    async fn begin(&self, query: RecordedCatalogQuery) -> Result<(), CatalogError> {
        self.queries.write().await.push(query);

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        if *self.always_fail.read().await {
            return Err(CatalogError::NotConfigured(
                "mock catalog set to fail".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AnimeCatalog for MockCatalog {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<AnimeRecord>, CatalogError> {
        self.begin(RecordedCatalogQuery::Search {
            query: query.to_string(),
            limit,
        })
        .await?;

        let normalized = normalize_query(query);
        if let Some(results) = self.search_results.read().await.get(&normalized) {
            return Ok(results.iter().take(limit as usize).cloned().collect());
        }

        let results = self
            .anime
            .read()
            .await
            .values()
            .filter(|a| a.title.to_lowercase().contains(&normalized))
            .take(limit as usize)
            .cloned()
            .collect();

        Ok(results)
    }

    async fn get_ranking(
        &self,
        kind: RankingKind,
        limit: u32,
    ) -> Result<Vec<AnimeRecord>, CatalogError> {
        self.begin(RecordedCatalogQuery::Ranking { kind, limit }).await?;

        if let Some(listing) = self.rankings.read().await.get(&kind) {
            return Ok(listing.iter().take(limit as usize).cloned().collect());
        }

        let mut listing: Vec<AnimeRecord> = self.anime.read().await.values().cloned().collect();
        listing.sort_by_key(|a| (a.popularity_rank.unwrap_or(u32::MAX), a.id));
        listing.truncate(limit as usize);

        Ok(listing)
    }

    async fn get_details(&self, id: u64) -> Result<AnimeRecord, CatalogError> {
        self.begin(RecordedCatalogQuery::Details { id }).await?;

        self.anime
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("Anime ID {}", id)))
    }

    async fn get_top_reviews(
        &self,
        id: u64,
        limit: u32,
    ) -> Result<Vec<CatalogReview>, CatalogError> {
        self.begin(RecordedCatalogQuery::Reviews { id, limit }).await?;

        Ok(self
            .reviews
            .read()
            .await
            .get(&id)
            .map(|reviews| reviews.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }
}
