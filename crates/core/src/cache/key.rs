//! Cache key normalization.

use std::fmt;

use serde::Serialize;

use crate::anime::RankingKind;

/// Normalized cache key.
///
/// Logically identical requests map to the same key: query text is trimmed,
/// lower-cased and has its inner whitespace collapsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a title search.
    pub fn search(query: &str, limit: u32) -> Self {
        Self(format!("search:{}:{}", normalize_query(query), limit))
    }

    /// Key for a ranking listing.
    pub fn ranking(kind: RankingKind, limit: u32) -> Self {
        Self(format!("ranking:{}:{}", kind.as_str(), limit))
    }

    /// Key for a single anime's details.
    pub fn details(id: u64) -> Self {
        Self(format!("anime:{}", id))
    }

    /// Key for the catalog reviews of one anime.
    pub fn reviews(id: u64, limit: u32) -> Self {
        Self(format!("reviews:{}:{}", id, limit))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Trim, lower-case and collapse whitespace in free-text queries.
pub fn normalize_query(query: &str) -> String {
    query
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
