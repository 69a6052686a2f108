//! Watchlist handlers. Every route acts for the authenticated caller.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use anitrack_core::{WatchStatus, WatchlistEntry};

use super::handlers::{api_error, library_error, ApiError, ApiResult, LooseNumber, SuccessResponse};
use super::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddWatchlistRequest {
    pub anime_id: u64,
    pub status: String,
    #[serde(default)]
    pub episodes_watched: Option<LooseNumber>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWatchlistRequest {
    pub status: String,
    #[serde(default)]
    pub episodes_watched: Option<LooseNumber>,
}

fn parse_status(raw: &str) -> Result<WatchStatus, ApiError> {
    WatchStatus::parse(raw).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!(
                "Invalid status '{}', expected one of: watching, completed, planned, dropped",
                raw
            ),
        )
    })
}

/// Negative or malformed counts read as zero.
fn episodes(raw: Option<&LooseNumber>) -> u32 {
    raw.map(|n| n.value().clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(0)
}

/// GET /api/v1/watchlist
///
/// Most recently updated first.
pub async fn list_watchlist(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<WatchlistEntry>>> {
    state
        .library()
        .list_watchlist(auth.user_id)
        .map(Json)
        .map_err(library_error)
}

/// POST /api/v1/watchlist
///
/// Adds the anime, or updates the existing entry for it.
pub async fn add_to_watchlist(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(request): Json<AddWatchlistRequest>,
) -> ApiResult<(StatusCode, Json<WatchlistEntry>)> {
    let status = parse_status(&request.status)?;

    let entry = state
        .library()
        .upsert_watchlist_entry(
            auth.user_id,
            request.anime_id,
            status,
            episodes(request.episodes_watched.as_ref()),
        )
        .map_err(library_error)?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /api/v1/watchlist/{id}
pub async fn update_watchlist_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<i64>,
    auth: AuthUser,
    Json(request): Json<UpdateWatchlistRequest>,
) -> ApiResult<Json<WatchlistEntry>> {
    let status = parse_status(&request.status)?;

    state
        .library()
        .update_watchlist_entry(
            entry_id,
            auth.user_id,
            status,
            episodes(request.episodes_watched.as_ref()),
        )
        .map(Json)
        .map_err(library_error)
}

/// DELETE /api/v1/watchlist/{id}
pub async fn delete_watchlist_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<i64>,
    auth: AuthUser,
) -> ApiResult<Json<SuccessResponse>> {
    state
        .library()
        .delete_watchlist_entry(entry_id, auth.user_id)
        .map_err(library_error)?;

    Ok(Json(SuccessResponse {
        message: format!("Removed watchlist entry {}", entry_id),
    }))
}
