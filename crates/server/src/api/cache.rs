//! Response cache inspection and invalidation.
//!
//! Reading the counters is open to everyone. Dropping entries sends later
//! requests back to the rate-limited catalog, so it needs a signed-in caller.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use anitrack_core::CacheStats;

use super::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub caches: Vec<CacheStats>,
}

#[derive(Debug, Serialize)]
pub struct ClearCacheResponse {
    pub cleared: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClearCacheQuery {
    /// `true` or `1` drops only entries past their TTL.
    #[serde(default)]
    pub expired_only: Option<String>,
}

impl ClearCacheQuery {
    fn expired_only(&self) -> bool {
        matches!(
            self.expired_only.as_deref().map(str::trim),
            Some("true") | Some("1")
        )
    }
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub id: u64,
    pub invalidated: bool,
}

/// GET /api/v1/cache/stats
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<CacheStatsResponse> {
    Json(CacheStatsResponse {
        caches: state.catalog().stats(),
    })
}

/// DELETE /api/v1/cache
///
/// Drops every cached catalog response, or with `?expired_only=true` just the
/// stale ones.
pub async fn clear_cache(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(params): Query<ClearCacheQuery>,
) -> Json<ClearCacheResponse> {
    let cleared = if params.expired_only() {
        state.catalog().purge_expired()
    } else {
        state.catalog().clear()
    };
    info!(
        "{} cleared {} cached catalog responses (expired_only={})",
        user.username,
        cleared,
        params.expired_only()
    );
    Json(ClearCacheResponse { cleared })
}

/// DELETE /api/v1/cache/anime/{id}
///
/// Forces the next details request for one anime back to the catalog.
pub async fn invalidate_anime(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(id): Path<u64>,
) -> Json<InvalidateResponse> {
    let invalidated = state.catalog().invalidate_details(id);
    info!(
        "{} invalidated cached details for anime {} (present={})",
        user.username, id, invalidated
    );
    Json(InvalidateResponse { id, invalidated })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_only_flag_is_lenient() {
        let query = |value: Option<&str>| ClearCacheQuery {
            expired_only: value.map(String::from),
        };

        assert!(query(Some("true")).expired_only());
        assert!(query(Some(" 1 ")).expired_only());
        assert!(!query(Some("yes please")).expired_only());
        assert!(!query(None).expired_only());
    }
}
