use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{auth_middleware, metrics_middleware};
use super::{anime, cache, handlers, reviews, users, watchlist};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Browsing (cached catalog + local filtering)
        .route("/anime/search", get(anime::search))
        .route("/anime/ranking/{kind}", get(anime::ranking))
        .route("/anime/trending", get(anime::trending))
        .route("/anime/home", get(anime::home))
        .route("/anime/genres", get(anime::list_genres))
        .route("/anime/genre/{name}", get(anime::by_genre))
        .route("/anime/{id}", get(anime::get_anime))
        // Reviews
        .route("/anime/{id}/reviews", get(reviews::list_reviews))
        .route("/anime/{id}/reviews", post(reviews::add_review))
        .route("/reviews/{id}", delete(reviews::delete_review))
        // Users
        .route("/users", post(users::create_user))
        .route("/users/me", get(users::get_me))
        .route("/users/me", delete(users::delete_me))
        .route("/users/{username}", get(users::get_profile))
        // Watchlist
        .route("/watchlist", get(watchlist::list_watchlist))
        .route("/watchlist", post(watchlist::add_to_watchlist))
        .route("/watchlist/{id}", put(watchlist::update_watchlist_entry))
        .route("/watchlist/{id}", delete(watchlist::delete_watchlist_entry))
        // Response cache
        .route("/cache/stats", get(cache::get_stats))
        .route("/cache", delete(cache::clear_cache))
        .route("/cache/anime/{id}", delete(cache::invalidate_anime))
        .layer(from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::get_metrics))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
