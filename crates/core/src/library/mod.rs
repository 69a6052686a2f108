//! Users, watchlists and reviews.
//!
//! Watchlist entries and reviews reference catalog anime by id only; anime
//! metadata is never stored locally.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteLibraryStore;
pub use store::{LibraryError, LibraryStore};
pub use types::{
    hash_token, parse_episodes, Review, User, WatchStatus, WatchlistEntry, MAX_EMAIL_LEN,
    MAX_RATING, MAX_USERNAME_LEN, MIN_RATING,
};
