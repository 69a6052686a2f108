//! User registration and profiles.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use anitrack_core::{Review, User, WatchlistEntry};

use super::handlers::{api_error, library_error, ApiResult, SuccessResponse};
use super::middleware::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub user: User,
    /// Shown once; only a digest is kept.
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
    pub watchlist: Vec<WatchlistEntry>,
    pub reviews: Vec<Review>,
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreateUserResponse>)> {
    let (user, token) = state
        .library()
        .create_user(&request.username, &request.email)
        .map_err(library_error)?;

    info!("Registered user {} ({})", user.username, user.id);
    Ok((StatusCode::CREATED, Json(CreateUserResponse { user, token })))
}

/// GET /api/v1/users/me
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<User>> {
    state
        .library()
        .get_user(auth.user_id)
        .map_err(library_error)?
        .map(Json)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "User no longer exists"))
}

/// DELETE /api/v1/users/me
///
/// Removes the account with its watchlist and reviews.
pub async fn delete_me(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> ApiResult<Json<SuccessResponse>> {
    state
        .library()
        .delete_user(auth.user_id)
        .map_err(library_error)?;

    info!("Deleted user {} ({})", auth.username, auth.user_id);
    Ok(Json(SuccessResponse {
        message: format!("Deleted user {}", auth.username),
    }))
}

/// GET /api/v1/users/{username}
///
/// A user's watchlist and reviews. Visible to signed-in callers only.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    _auth: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let library = state.library();
    let user = library
        .get_user_by_username(&username)
        .map_err(library_error)?
        .ok_or_else(|| {
            api_error(
                StatusCode::NOT_FOUND,
                format!("User not found: {}", username),
            )
        })?;

    let watchlist = library.list_watchlist(user.id).map_err(library_error)?;
    let reviews = library.list_user_reviews(user.id).map_err(library_error)?;

    Ok(Json(ProfileResponse {
        user,
        watchlist,
        reviews,
    }))
}
