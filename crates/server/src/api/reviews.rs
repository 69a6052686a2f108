//! Review handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use anitrack_core::library::{MAX_RATING, MIN_RATING};
use anitrack_core::Review;

use super::handlers::{api_error, library_error, ApiResult, LooseNumber, SuccessResponse};
use super::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddReviewRequest {
    pub rating: LooseNumber,
    #[serde(default)]
    pub text: String,
}

/// GET /api/v1/anime/{id}/reviews
///
/// Newest first.
pub async fn list_reviews(
    State(state): State<Arc<AppState>>,
    Path(anime_id): Path<u64>,
) -> ApiResult<Json<Vec<Review>>> {
    state
        .library()
        .list_reviews(anime_id)
        .map(Json)
        .map_err(library_error)
}

/// POST /api/v1/anime/{id}/reviews
///
/// Saves the caller's review, replacing an earlier one.
pub async fn add_review(
    State(state): State<Arc<AppState>>,
    Path(anime_id): Path<u64>,
    auth: AuthUser,
    Json(request): Json<AddReviewRequest>,
) -> ApiResult<(StatusCode, Json<Review>)> {
    let rating = u8::try_from(request.rating.value())
        .ok()
        .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
        .ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Rating must be between {} and {}", MIN_RATING, MAX_RATING),
            )
        })?;

    let review = state
        .library()
        .add_review(auth.user_id, anime_id, rating, request.text.trim())
        .map_err(library_error)?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// DELETE /api/v1/reviews/{id}
///
/// Only the author may delete a review.
pub async fn delete_review(
    State(state): State<Arc<AppState>>,
    Path(review_id): Path<i64>,
    auth: AuthUser,
) -> ApiResult<Json<SuccessResponse>> {
    state
        .library()
        .delete_review(review_id, auth.user_id)
        .map_err(library_error)?;

    Ok(Json(SuccessResponse {
        message: format!("Deleted review {}", review_id),
    }))
}
