use thiserror::Error;

use super::{Review, User, WatchStatus, WatchlistEntry};

/// Errors from the library store.
#[derive(Debug, Error)]
pub enum LibraryError {
    /// Row not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller does not own the row.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unique or other constraint violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Input rejected before touching the database.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Trait for user/watchlist/review storage backends.
pub trait LibraryStore: Send + Sync {
    // Users

    /// Register a user and issue an access token. Only a digest of the token
    /// is stored, so the returned value is the only copy.
    fn create_user(&self, username: &str, email: &str) -> Result<(User, String), LibraryError>;

    fn get_user(&self, user_id: i64) -> Result<Option<User>, LibraryError>;

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, LibraryError>;

    /// Resolve an access token to its user.
    fn authenticate_token(&self, token: &str) -> Result<Option<User>, LibraryError>;

    /// Delete a user together with their watchlist and reviews.
    fn delete_user(&self, user_id: i64) -> Result<(), LibraryError>;

    // Watchlist

    /// Insert or update the user's entry for an anime.
    fn upsert_watchlist_entry(
        &self,
        user_id: i64,
        anime_id: u64,
        status: WatchStatus,
        episodes_watched: u32,
    ) -> Result<WatchlistEntry, LibraryError>;

    fn get_watchlist_entry(
        &self,
        user_id: i64,
        anime_id: u64,
    ) -> Result<Option<WatchlistEntry>, LibraryError>;

    /// All entries of a user, most recently updated first.
    fn list_watchlist(&self, user_id: i64) -> Result<Vec<WatchlistEntry>, LibraryError>;

    /// Update an entry owned by `user_id`.
    fn update_watchlist_entry(
        &self,
        entry_id: i64,
        user_id: i64,
        status: WatchStatus,
        episodes_watched: u32,
    ) -> Result<WatchlistEntry, LibraryError>;

    /// Delete an entry owned by `user_id`.
    fn delete_watchlist_entry(&self, entry_id: i64, user_id: i64) -> Result<(), LibraryError>;

    // Reviews

    /// Save the user's review of an anime, replacing any earlier one.
    fn add_review(
        &self,
        user_id: i64,
        anime_id: u64,
        rating: u8,
        text: &str,
    ) -> Result<Review, LibraryError>;

    /// Reviews of an anime, newest first.
    fn list_reviews(&self, anime_id: u64) -> Result<Vec<Review>, LibraryError>;

    /// Reviews written by a user, newest first.
    fn list_user_reviews(&self, user_id: i64) -> Result<Vec<Review>, LibraryError>;

    /// Delete a review. Only its author may do so.
    fn delete_review(&self, review_id: i64, user_id: i64) -> Result<(), LibraryError>;
}
