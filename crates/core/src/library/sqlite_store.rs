//! SQLite-backed library store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::debug;

use super::types::hash_token;
use super::{
    LibraryError, LibraryStore, Review, User, WatchStatus, WatchlistEntry, MAX_EMAIL_LEN,
    MAX_RATING, MAX_USERNAME_LEN, MIN_RATING,
};

const USER_COLUMNS: &str = "id, username, email, created_at";
const ENTRY_COLUMNS: &str = "id, user_id, anime_id, status, episodes_watched, last_updated";
const REVIEW_COLUMNS: &str =
    "r.id, r.user_id, u.username, r.anime_id, r.rating, r.review_text, r.review_date";

/// SQLite-backed library store.
pub struct SqliteLibraryStore {
    conn: Mutex<Connection>,
}

impl SqliteLibraryStore {
    /// Create a new SQLite store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, LibraryError> {
        let conn = Connection::open(path).map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self, LibraryError> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), LibraryError> {
        conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE,
                token_hash TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL
            );

            -- Anime ids refer to the remote catalog; there is no local anime table.
            CREATE TABLE IF NOT EXISTS watchlist (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                anime_id INTEGER NOT NULL,
                status TEXT NOT NULL
                    CHECK (status IN ('watching', 'completed', 'planned', 'dropped')),
                episodes_watched INTEGER NOT NULL DEFAULT 0,
                last_updated TEXT NOT NULL,
                UNIQUE(user_id, anime_id)
            );

            CREATE INDEX IF NOT EXISTS idx_watchlist_user ON watchlist(user_id, last_updated);

            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                anime_id INTEGER NOT NULL,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 10),
                review_text TEXT NOT NULL DEFAULT '',
                review_date TEXT NOT NULL,
                UNIQUE(user_id, anime_id)
            );

            CREATE INDEX IF NOT EXISTS idx_reviews_anime ON reviews(anime_id, review_date);
            "#,
        )
        .map_err(db_err)?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, LibraryError> {
        self.conn
            .lock()
            .map_err(|e| LibraryError::Database(format!("connection lock poisoned: {}", e)))
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        let created_at: String = row.get(3)?;
        Ok(User {
            id: row.get(0)?,
            username: row.get(1)?,
            email: row.get(2)?,
            created_at: parse_timestamp(&created_at),
        })
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<WatchlistEntry> {
        let anime_id: i64 = row.get(2)?;
        let status: String = row.get(3)?;
        let last_updated: String = row.get(5)?;

        Ok(WatchlistEntry {
            id: row.get(0)?,
            user_id: row.get(1)?,
            anime_id: anime_id as u64,
            // The CHECK constraint keeps unknown values out.
            status: WatchStatus::parse(&status).unwrap_or(WatchStatus::Planned),
            episodes_watched: row.get(4)?,
            last_updated: parse_timestamp(&last_updated),
        })
    }

    fn row_to_review(row: &rusqlite::Row) -> rusqlite::Result<Review> {
        let anime_id: i64 = row.get(3)?;
        let review_date: String = row.get(6)?;

        Ok(Review {
            id: row.get(0)?,
            user_id: row.get(1)?,
            username: row.get(2)?,
            anime_id: anime_id as u64,
            rating: row.get(4)?,
            text: row.get(5)?,
            review_date: parse_timestamp(&review_date),
        })
    }

    fn user_exists(conn: &Connection, user_id: i64) -> Result<bool, LibraryError> {
        conn.query_row("SELECT 1 FROM users WHERE id = ?", params![user_id], |_| {
            Ok(())
        })
        .optional()
        .map(|found| found.is_some())
        .map_err(db_err)
    }

    fn require_user(conn: &Connection, user_id: i64) -> Result<(), LibraryError> {
        if Self::user_exists(conn, user_id)? {
            Ok(())
        } else {
            Err(LibraryError::NotFound(format!("User {}", user_id)))
        }
    }

    fn load_entry(conn: &Connection, entry_id: i64) -> Result<WatchlistEntry, LibraryError> {
        conn.query_row(
            &format!("SELECT {} FROM watchlist WHERE id = ?", ENTRY_COLUMNS),
            params![entry_id],
            Self::row_to_entry,
        )
        .optional()
        .map_err(db_err)?
        .ok_or_else(|| LibraryError::NotFound(format!("Watchlist entry {}", entry_id)))
    }

    fn query_reviews(
        conn: &Connection,
        where_clause: &str,
        id: i64,
    ) -> Result<Vec<Review>, LibraryError> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM reviews r JOIN users u ON u.id = r.user_id
                 WHERE {} ORDER BY r.review_date DESC, r.id DESC",
                REVIEW_COLUMNS, where_clause
            ))
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![id], Self::row_to_review)
            .map_err(db_err)?;

        let mut reviews = Vec::new();
        for row in rows {
            reviews.push(row.map_err(db_err)?);
        }
        Ok(reviews)
    }
}

impl LibraryStore for SqliteLibraryStore {
    fn create_user(&self, username: &str, email: &str) -> Result<(User, String), LibraryError> {
        let username = username.trim();
        let email = email.trim().to_lowercase();

        if username.is_empty() || email.is_empty() {
            return Err(LibraryError::Validation(
                "username and email are required".to_string(),
            ));
        }
        if username.chars().count() > MAX_USERNAME_LEN || email.chars().count() > MAX_EMAIL_LEN {
            return Err(LibraryError::Validation(format!(
                "username is limited to {} characters and email to {}",
                MAX_USERNAME_LEN, MAX_EMAIL_LEN
            )));
        }

        let token = uuid::Uuid::new_v4().simple().to_string();
        let created_at = now_timestamp();

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (username, email, token_hash, created_at) VALUES (?, ?, ?, ?)",
            params![username, email, hash_token(&token), &created_at],
        )
        .map_err(|e| match write_err(e) {
            LibraryError::Conflict(_) => {
                LibraryError::Conflict("username or email already exists".to_string())
            }
            other => other,
        })?;

        let user = User {
            id: conn.last_insert_rowid(),
            username: username.to_string(),
            email,
            created_at: parse_timestamp(&created_at),
        };
        debug!("Created user {} ({})", user.username, user.id);

        Ok((user, token))
    }

    fn get_user(&self, user_id: i64) -> Result<Option<User>, LibraryError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS),
            params![user_id],
            Self::row_to_user,
        )
        .optional()
        .map_err(db_err)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>, LibraryError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM users WHERE username = ?", USER_COLUMNS),
            params![username.trim()],
            Self::row_to_user,
        )
        .optional()
        .map_err(db_err)
    }

    fn authenticate_token(&self, token: &str) -> Result<Option<User>, LibraryError> {
        if token.is_empty() {
            return Ok(None);
        }

        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM users WHERE token_hash = ?", USER_COLUMNS),
            params![hash_token(token)],
            Self::row_to_user,
        )
        .optional()
        .map_err(db_err)
    }

    fn delete_user(&self, user_id: i64) -> Result<(), LibraryError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(db_err)?;

        // Explicit cleanup so the result does not depend on the foreign_keys pragma.
        let reviews = tx
            .execute("DELETE FROM reviews WHERE user_id = ?", params![user_id])
            .map_err(db_err)?;
        let entries = tx
            .execute("DELETE FROM watchlist WHERE user_id = ?", params![user_id])
            .map_err(db_err)?;
        let users = tx
            .execute("DELETE FROM users WHERE id = ?", params![user_id])
            .map_err(db_err)?;

        if users == 0 {
            // Dropping the transaction rolls it back.
            return Err(LibraryError::NotFound(format!("User {}", user_id)));
        }

        tx.commit().map_err(db_err)?;
        debug!(
            "Deleted user {} with {} reviews and {} watchlist entries",
            user_id, reviews, entries
        );
        Ok(())
    }

    fn upsert_watchlist_entry(
        &self,
        user_id: i64,
        anime_id: u64,
        status: WatchStatus,
        episodes_watched: u32,
    ) -> Result<WatchlistEntry, LibraryError> {
        let conn = self.conn()?;
        Self::require_user(&conn, user_id)?;

        conn.execute(
            "INSERT INTO watchlist (user_id, anime_id, status, episodes_watched, last_updated)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(user_id, anime_id) DO UPDATE SET
                status = excluded.status,
                episodes_watched = excluded.episodes_watched,
                last_updated = excluded.last_updated",
            params![
                user_id,
                anime_id as i64,
                status.as_str(),
                episodes_watched,
                now_timestamp(),
            ],
        )
        .map_err(write_err)?;

        conn.query_row(
            &format!(
                "SELECT {} FROM watchlist WHERE user_id = ? AND anime_id = ?",
                ENTRY_COLUMNS
            ),
            params![user_id, anime_id as i64],
            Self::row_to_entry,
        )
        .map_err(db_err)
    }

    fn get_watchlist_entry(
        &self,
        user_id: i64,
        anime_id: u64,
    ) -> Result<Option<WatchlistEntry>, LibraryError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM watchlist WHERE user_id = ? AND anime_id = ?",
                ENTRY_COLUMNS
            ),
            params![user_id, anime_id as i64],
            Self::row_to_entry,
        )
        .optional()
        .map_err(db_err)
    }

    fn list_watchlist(&self, user_id: i64) -> Result<Vec<WatchlistEntry>, LibraryError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM watchlist WHERE user_id = ?
                 ORDER BY last_updated DESC, id DESC",
                ENTRY_COLUMNS
            ))
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![user_id], Self::row_to_entry)
            .map_err(db_err)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(db_err)?);
        }
        Ok(entries)
    }

    fn update_watchlist_entry(
        &self,
        entry_id: i64,
        user_id: i64,
        status: WatchStatus,
        episodes_watched: u32,
    ) -> Result<WatchlistEntry, LibraryError> {
        let conn = self.conn()?;
        let updated = conn
            .execute(
                "UPDATE watchlist SET status = ?, episodes_watched = ?, last_updated = ?
                 WHERE id = ? AND user_id = ?",
                params![
                    status.as_str(),
                    episodes_watched,
                    now_timestamp(),
                    entry_id,
                    user_id
                ],
            )
            .map_err(write_err)?;

        if updated == 0 {
            return Err(LibraryError::NotFound(format!(
                "Watchlist entry {}",
                entry_id
            )));
        }

        Self::load_entry(&conn, entry_id)
    }

    fn delete_watchlist_entry(&self, entry_id: i64, user_id: i64) -> Result<(), LibraryError> {
        let conn = self.conn()?;
        let deleted = conn
            .execute(
                "DELETE FROM watchlist WHERE id = ? AND user_id = ?",
                params![entry_id, user_id],
            )
            .map_err(db_err)?;

        if deleted == 0 {
            return Err(LibraryError::NotFound(format!(
                "Watchlist entry {}",
                entry_id
            )));
        }
        Ok(())
    }

    fn add_review(
        &self,
        user_id: i64,
        anime_id: u64,
        rating: u8,
        text: &str,
    ) -> Result<Review, LibraryError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(LibraryError::Validation(format!(
                "rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        let conn = self.conn()?;
        Self::require_user(&conn, user_id)?;

        conn.execute(
            "INSERT INTO reviews (user_id, anime_id, rating, review_text, review_date)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(user_id, anime_id) DO UPDATE SET
                rating = excluded.rating,
                review_text = excluded.review_text,
                review_date = excluded.review_date",
            params![user_id, anime_id as i64, rating, text.trim(), now_timestamp()],
        )
        .map_err(write_err)?;

        let review_id: i64 = conn
            .query_row(
                "SELECT id FROM reviews WHERE user_id = ? AND anime_id = ?",
                params![user_id, anime_id as i64],
                |row| row.get(0),
            )
            .map_err(db_err)?;

        Self::query_reviews(&conn, "r.id = ?", review_id)?
            .pop()
            .ok_or_else(|| LibraryError::NotFound(format!("Review {}", review_id)))
    }

    fn list_reviews(&self, anime_id: u64) -> Result<Vec<Review>, LibraryError> {
        let conn = self.conn()?;
        Self::query_reviews(&conn, "r.anime_id = ?", anime_id as i64)
    }

    fn list_user_reviews(&self, user_id: i64) -> Result<Vec<Review>, LibraryError> {
        let conn = self.conn()?;
        Self::query_reviews(&conn, "r.user_id = ?", user_id)
    }

    fn delete_review(&self, review_id: i64, user_id: i64) -> Result<(), LibraryError> {
        let conn = self.conn()?;

        let author: Option<i64> = conn
            .query_row(
                "SELECT user_id FROM reviews WHERE id = ?",
                params![review_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;

        match author {
            None => Err(LibraryError::NotFound(format!("Review {}", review_id))),
            Some(author) if author != user_id => Err(LibraryError::Forbidden(format!(
                "Review {} belongs to another user",
                review_id
            ))),
            Some(_) => {
                conn.execute(
                    "DELETE FROM reviews WHERE id = ? AND user_id = ?",
                    params![review_id, user_id],
                )
                .map_err(db_err)?;
                Ok(())
            }
        }
    }
}

fn db_err(e: rusqlite::Error) -> LibraryError {
    LibraryError::Database(e.to_string())
}

/// Like [`db_err`], but constraint violations become conflicts.
fn write_err(e: rusqlite::Error) -> LibraryError {
    if let rusqlite::Error::SqliteFailure(err, msg) = &e {
        if err.code == ErrorCode::ConstraintViolation {
            return LibraryError::Conflict(msg.clone().unwrap_or_else(|| err.to_string()));
        }
    }
    db_err(e)
}

/// Fixed-width UTC timestamps, so text order matches time order.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteLibraryStore {
        SqliteLibraryStore::in_memory().unwrap()
    }

    fn create_test_user(store: &SqliteLibraryStore, username: &str) -> User {
        let (user, _token) = store
            .create_user(username, &format!("{}@example.com", username))
            .unwrap();
        user
    }

    #[test]
    fn test_create_user_lowercases_email() {
        let store = create_test_store();
        let (user, token) = store.create_user("  spike ", "Spike@Bebop.SPACE").unwrap();

        assert_eq!(user.username, "spike");
        assert_eq!(user.email, "spike@bebop.space");
        assert!(!token.is_empty());

        let fetched = store.get_user(user.id).unwrap().unwrap();
        assert_eq!(fetched.username, "spike");
    }

    #[test]
    fn test_create_user_validation() {
        let store = create_test_store();

        assert!(matches!(
            store.create_user("", "a@b.c"),
            Err(LibraryError::Validation(_))
        ));
        assert!(matches!(
            store.create_user("x", "   "),
            Err(LibraryError::Validation(_))
        ));
        assert!(matches!(
            store.create_user(&"u".repeat(51), "a@b.c"),
            Err(LibraryError::Validation(_))
        ));
        assert!(matches!(
            store.create_user("x", &format!("{}@b.c", "a".repeat(100))),
            Err(LibraryError::Validation(_))
        ));
        assert!(store.create_user(&"u".repeat(50), "a@b.c").is_ok());
    }

    #[test]
    fn test_duplicate_username_or_email_conflicts() {
        let store = create_test_store();
        store.create_user("faye", "faye@example.com").unwrap();

        assert!(matches!(
            store.create_user("faye", "other@example.com"),
            Err(LibraryError::Conflict(_))
        ));
        assert!(matches!(
            store.create_user("valentine", "FAYE@example.com"),
            Err(LibraryError::Conflict(_))
        ));
    }

    #[test]
    fn test_authenticate_token() {
        let store = create_test_store();
        let (user, token) = store.create_user("jet", "jet@example.com").unwrap();

        let found = store.authenticate_token(&token).unwrap().unwrap();
        assert_eq!(found.id, user.id);

        assert!(store.authenticate_token("not-a-token").unwrap().is_none());
        assert!(store.authenticate_token("").unwrap().is_none());
    }

    #[test]
    fn test_get_user_by_username() {
        let store = create_test_store();
        let user = create_test_user(&store, "ed");

        assert_eq!(store.get_user_by_username("ed").unwrap(), Some(user));
        assert!(store.get_user_by_username("ein").unwrap().is_none());
    }

    #[test]
    fn test_watchlist_upsert_keeps_one_entry() {
        let store = create_test_store();
        let user = create_test_user(&store, "spike");

        let first = store
            .upsert_watchlist_entry(user.id, 1, WatchStatus::Planned, 0)
            .unwrap();
        let second = store
            .upsert_watchlist_entry(user.id, 1, WatchStatus::Watching, 5)
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, WatchStatus::Watching);
        assert_eq!(second.episodes_watched, 5);
        assert_eq!(store.list_watchlist(user.id).unwrap().len(), 1);
    }

    #[test]
    fn test_watchlist_for_unknown_user() {
        let store = create_test_store();
        let result = store.upsert_watchlist_entry(999, 1, WatchStatus::Planned, 0);
        assert!(matches!(result, Err(LibraryError::NotFound(_))));
    }

    #[test]
    fn test_list_watchlist_most_recent_first() {
        let store = create_test_store();
        let user = create_test_user(&store, "spike");

        store
            .upsert_watchlist_entry(user.id, 1, WatchStatus::Completed, 26)
            .unwrap();
        store
            .upsert_watchlist_entry(user.id, 5114, WatchStatus::Watching, 3)
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store
            .upsert_watchlist_entry(user.id, 1, WatchStatus::Completed, 26)
            .unwrap();

        let anime_ids: Vec<u64> = store
            .list_watchlist(user.id)
            .unwrap()
            .iter()
            .map(|e| e.anime_id)
            .collect();
        assert_eq!(anime_ids, vec![1, 5114]);
    }

    #[test]
    fn test_update_watchlist_entry_requires_owner() {
        let store = create_test_store();
        let owner = create_test_user(&store, "owner");
        let other = create_test_user(&store, "other");
        let entry = store
            .upsert_watchlist_entry(owner.id, 20, WatchStatus::Watching, 1)
            .unwrap();

        let result = store.update_watchlist_entry(entry.id, other.id, WatchStatus::Dropped, 2);
        assert!(matches!(result, Err(LibraryError::NotFound(_))));

        let updated = store
            .update_watchlist_entry(entry.id, owner.id, WatchStatus::Dropped, 2)
            .unwrap();
        assert_eq!(updated.status, WatchStatus::Dropped);
        assert_eq!(updated.episodes_watched, 2);
    }

    #[test]
    fn test_delete_watchlist_entry() {
        let store = create_test_store();
        let user = create_test_user(&store, "spike");
        let entry = store
            .upsert_watchlist_entry(user.id, 20, WatchStatus::Planned, 0)
            .unwrap();

        assert!(matches!(
            store.delete_watchlist_entry(entry.id, user.id + 1),
            Err(LibraryError::NotFound(_))
        ));
        store.delete_watchlist_entry(entry.id, user.id).unwrap();
        assert!(store.get_watchlist_entry(user.id, 20).unwrap().is_none());
    }

    #[test]
    fn test_add_review_upserts() {
        let store = create_test_store();
        let user = create_test_user(&store, "critic");

        let first = store.add_review(user.id, 1, 7, "good").unwrap();
        let second = store.add_review(user.id, 1, 9, "  actually great ").unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.rating, 9);
        assert_eq!(second.text, "actually great");
        assert_eq!(second.username, "critic");
        assert_eq!(store.list_reviews(1).unwrap().len(), 1);
    }

    #[test]
    fn test_add_review_rating_bounds() {
        let store = create_test_store();
        let user = create_test_user(&store, "critic");

        assert!(matches!(
            store.add_review(user.id, 1, 0, ""),
            Err(LibraryError::Validation(_))
        ));
        assert!(matches!(
            store.add_review(user.id, 1, 11, ""),
            Err(LibraryError::Validation(_))
        ));
        assert!(store.add_review(user.id, 1, 1, "").is_ok());
        assert!(store.add_review(user.id, 2, 10, "").is_ok());
    }

    #[test]
    fn test_list_reviews_newest_first() {
        let store = create_test_store();
        let a = create_test_user(&store, "a");
        let b = create_test_user(&store, "b");

        store.add_review(a.id, 1, 8, "first").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store.add_review(b.id, 1, 6, "second").unwrap();
        store.add_review(b.id, 2, 6, "other anime").unwrap();

        let texts: Vec<String> = store
            .list_reviews(1)
            .unwrap()
            .into_iter()
            .map(|r| r.text)
            .collect();
        assert_eq!(texts, vec!["second", "first"]);
        assert_eq!(store.list_user_reviews(b.id).unwrap().len(), 2);
    }

    #[test]
    fn test_delete_review_only_by_author() {
        let store = create_test_store();
        let author = create_test_user(&store, "author");
        let other = create_test_user(&store, "other");
        let review = store.add_review(author.id, 1, 8, "mine").unwrap();

        assert!(matches!(
            store.delete_review(review.id, other.id),
            Err(LibraryError::Forbidden(_))
        ));
        store.delete_review(review.id, author.id).unwrap();
        assert!(matches!(
            store.delete_review(review.id, author.id),
            Err(LibraryError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_user_cascades() {
        let store = create_test_store();
        let user = create_test_user(&store, "leaving");
        let stays = create_test_user(&store, "stays");
        store
            .upsert_watchlist_entry(user.id, 1, WatchStatus::Watching, 1)
            .unwrap();
        store.add_review(user.id, 1, 5, "meh").unwrap();
        store.add_review(stays.id, 1, 9, "great").unwrap();

        store.delete_user(user.id).unwrap();

        assert!(store.get_user(user.id).unwrap().is_none());
        assert!(store.list_watchlist(user.id).unwrap().is_empty());
        let remaining = store.list_reviews(1).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].username, "stays");

        assert!(matches!(
            store.delete_user(user.id),
            Err(LibraryError::NotFound(_))
        ));
    }

    #[test]
    fn test_file_based_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("library.db");

        let (user_id, token) = {
            let store = SqliteLibraryStore::new(&db_path).unwrap();
            let (user, token) = store.create_user("persist", "p@example.com").unwrap();
            (user.id, token)
        };

        assert!(db_path.exists());

        let reopened = SqliteLibraryStore::new(&db_path).unwrap();
        let user = reopened.authenticate_token(&token).unwrap().unwrap();
        assert_eq!(user.id, user_id);
    }
}
