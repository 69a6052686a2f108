use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 10;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Stored lower-cased.
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Where a user is with an anime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    Watching,
    Completed,
    Planned,
    Dropped,
}

impl WatchStatus {
    pub const ALL: [WatchStatus; 4] = [
        WatchStatus::Completed,
        WatchStatus::Dropped,
        WatchStatus::Planned,
        WatchStatus::Watching,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Watching => "watching",
            WatchStatus::Completed => "completed",
            WatchStatus::Planned => "planned",
            WatchStatus::Dropped => "dropped",
        }
    }

    /// Parse a status name, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's tracked status for one catalog anime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub id: i64,
    pub user_id: i64,
    pub anime_id: u64,
    pub status: WatchStatus,
    pub episodes_watched: u32,
    pub last_updated: DateTime<Utc>,
}

/// A user's review of one catalog anime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub username: String,
    pub anime_id: u64,
    /// 1 to 10.
    pub rating: u8,
    pub text: String,
    pub review_date: DateTime<Utc>,
}

/// Parse an episode count leniently: negative or malformed input counts as
/// zero.
pub fn parse_episodes(raw: &str) -> u32 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0;
    }
    match raw.parse::<i64>() {
        Ok(n) => n.clamp(0, u32::MAX as i64) as u32,
        Err(_) => 0,
    }
}

/// Hex SHA-256 of an access token. Only this digest is persisted.
pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_status_parse() {
        assert_eq!(WatchStatus::parse("Watching"), Some(WatchStatus::Watching));
        assert_eq!(WatchStatus::parse(" dropped "), Some(WatchStatus::Dropped));
        assert_eq!(WatchStatus::parse("on-hold"), None);
        assert_eq!(WatchStatus::parse(""), None);
    }

    #[test]
    fn test_watch_status_serialization() {
        let json = serde_json::to_string(&WatchStatus::Planned).unwrap();
        assert_eq!(json, "\"planned\"");
    }

    #[test]
    fn test_parse_episodes_is_lenient() {
        assert_eq!(parse_episodes("12"), 12);
        assert_eq!(parse_episodes(" 3 "), 3);
        assert_eq!(parse_episodes("-4"), 0);
        assert_eq!(parse_episodes("twelve"), 0);
        assert_eq!(parse_episodes(""), 0);
        assert_eq!(parse_episodes("2.5"), 0);
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let digest = hash_token("secret");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, hash_token("secret"));
        assert_ne!(digest, hash_token("Secret"));
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
