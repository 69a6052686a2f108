//! Anime catalog integration.
//!
//! The remote catalog (MyAnimeList) is reached through the [`AnimeCatalog`]
//! trait. [`CachedCatalog`] puts a TTL cache in front of any implementation.

mod cached;
mod mal;

pub use cached::CachedCatalog;
pub use mal::MalClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::anime::{AnimeRecord, CatalogReview, RankingKind};

/// Largest page the catalog serves for a title search.
pub const MAX_SEARCH_LIMIT: u32 = 100;
/// Largest page the catalog serves for a ranking listing.
pub const MAX_RANKING_LIMIT: u32 = 500;
/// Largest page of catalog reviews requested at once.
pub const MAX_REVIEWS_LIMIT: u32 = 20;

/// Errors that can occur when talking to the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed (connection error, timeout, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing or rejected client id).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

impl CatalogError {
    /// Short label used for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Http(_) => "http",
            CatalogError::RateLimitExceeded => "rate_limited",
            CatalogError::NotFound(_) => "not_found",
            CatalogError::Api { .. } => "api",
            CatalogError::Parse(_) => "parse",
            CatalogError::NotConfigured(_) => "not_configured",
        }
    }
}

/// Source of anime metadata.
#[async_trait]
pub trait AnimeCatalog: Send + Sync {
    /// Search anime by title text.
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<AnimeRecord>, CatalogError>;

    /// Get a ranking listing.
    async fn get_ranking(
        &self,
        kind: RankingKind,
        limit: u32,
    ) -> Result<Vec<AnimeRecord>, CatalogError>;

    /// Get full details for one anime.
    async fn get_details(&self, id: u64) -> Result<AnimeRecord, CatalogError>;

    /// Get the most helpful catalog reviews for one anime.
    async fn get_top_reviews(
        &self,
        id: u64,
        limit: u32,
    ) -> Result<Vec<CatalogReview>, CatalogError>;
}

/// Catalog used when no client id is configured. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredCatalog;

impl UnconfiguredCatalog {
    fn error() -> CatalogError {
        CatalogError::NotConfigured("MyAnimeList client id not configured".to_string())
    }
}

#[async_trait]
impl AnimeCatalog for UnconfiguredCatalog {
    async fn search(&self, _query: &str, _limit: u32) -> Result<Vec<AnimeRecord>, CatalogError> {
        Err(Self::error())
    }

    async fn get_ranking(
        &self,
        _kind: RankingKind,
        _limit: u32,
    ) -> Result<Vec<AnimeRecord>, CatalogError> {
        Err(Self::error())
    }

    async fn get_details(&self, _id: u64) -> Result<AnimeRecord, CatalogError> {
        Err(Self::error())
    }

    async fn get_top_reviews(
        &self,
        _id: u64,
        _limit: u32,
    ) -> Result<Vec<CatalogReview>, CatalogError> {
        Err(Self::error())
    }
}
