//! Catalog record types shared by the cache, the filter engine and the API.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An anime as described by the external catalog.
///
/// Records are immutable once fetched and are never persisted locally; they
/// live as long as the cache entry holding them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimeRecord {
    /// Catalog identifier (MyAnimeList anime id).
    pub id: u64,
    /// Main title.
    pub title: String,
    /// Media type as reported by the catalog ("tv", "movie", "ova", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Year of the first airing / release.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    /// Number of episodes (unknown while airing).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    /// Mean user score (0-10).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_score: Option<f64>,
    /// Popularity rank (1 = most popular).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popularity_rank: Option<u32>,
    #[serde(default)]
    pub genres: BTreeSet<String>,
    #[serde(default)]
    pub studios: BTreeSet<String>,

    // Detail-only fields, absent from search and ranking listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub english_title: Option<String>,
    /// Airing status ("finished_airing", "currently_airing", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Score rank (1 = best rated).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Audience rating ("pg_13", "r", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_rating: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_episode_duration_secs: Option<u32>,
}

impl AnimeRecord {
    /// Create a record with only the mandatory fields set.
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            media_type: None,
            release_year: None,
            episode_count: None,
            synopsis: None,
            poster_url: None,
            mean_score: None,
            popularity_rank: None,
            genres: BTreeSet::new(),
            studios: BTreeSet::new(),
            english_title: None,
            status: None,
            rank: None,
            start_date: None,
            end_date: None,
            age_rating: None,
            average_episode_duration_secs: None,
        }
    }
}

/// Parse the year out of a catalog date ("YYYY-MM-DD", "YYYY-MM" or "YYYY").
pub fn year_from_date(date: &str) -> Option<i32> {
    date.split('-').next().and_then(|y| y.trim().parse().ok())
}

/// Media types understood by the type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    Tv,
    Movie,
    Ova,
    Ona,
    Special,
    TvSpecial,
    Music,
    /// Promotional video.
    Pv,
    /// Commercial.
    Cm,
    /// Reported by the catalog when the type is not yet known.
    Unknown,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Tv => "tv",
            MediaType::Movie => "movie",
            MediaType::Ova => "ova",
            MediaType::Ona => "ona",
            MediaType::Special => "special",
            MediaType::TvSpecial => "tv_special",
            MediaType::Music => "music",
            MediaType::Pv => "pv",
            MediaType::Cm => "cm",
            MediaType::Unknown => "unknown",
        }
    }

    /// Parse a media type, ignoring case. Unrecognised values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "tv" => Some(MediaType::Tv),
            "movie" => Some(MediaType::Movie),
            "ova" => Some(MediaType::Ova),
            "ona" => Some(MediaType::Ona),
            "special" => Some(MediaType::Special),
            "tv_special" => Some(MediaType::TvSpecial),
            "music" => Some(MediaType::Music),
            "pv" => Some(MediaType::Pv),
            "cm" => Some(MediaType::Cm),
            "unknown" => Some(MediaType::Unknown),
            _ => None,
        }
    }

    /// Case-insensitive comparison against a catalog-reported type string.
    pub fn matches(&self, reported: &str) -> bool {
        reported.trim().eq_ignore_ascii_case(self.as_str())
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranking listings offered by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingKind {
    All,
    Airing,
    Upcoming,
    Tv,
    Ova,
    Movie,
    Special,
    ByPopularity,
    Favorite,
}

impl RankingKind {
    pub const ALL_KINDS: [RankingKind; 9] = [
        RankingKind::All,
        RankingKind::Airing,
        RankingKind::Upcoming,
        RankingKind::Tv,
        RankingKind::Ova,
        RankingKind::Movie,
        RankingKind::Special,
        RankingKind::ByPopularity,
        RankingKind::Favorite,
    ];

    /// Wire name used by the catalog API.
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingKind::All => "all",
            RankingKind::Airing => "airing",
            RankingKind::Upcoming => "upcoming",
            RankingKind::Tv => "tv",
            RankingKind::Ova => "ova",
            RankingKind::Movie => "movie",
            RankingKind::Special => "special",
            RankingKind::ByPopularity => "bypopularity",
            RankingKind::Favorite => "favorite",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL_KINDS
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for RankingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Genres with a known catalog id, used for the genre browser.
pub const KNOWN_GENRES: [(&str, u32); 17] = [
    ("Action", 1),
    ("Adventure", 2),
    ("Comedy", 4),
    ("Drama", 8),
    ("Fantasy", 10),
    ("Horror", 14),
    ("Romance", 22),
    ("Sci-Fi", 24),
    ("Slice of Life", 36),
    ("Sports", 30),
    ("Supernatural", 37),
    ("Mystery", 7),
    ("Psychological", 40),
    ("Thriller", 41),
    ("Music", 19),
    ("Ecchi", 9),
    ("Mecha", 18),
];

/// A user review published on the catalog, shown next to local reviews.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogReview {
    pub reviewer: String,
    /// Score the reviewer gave (1-10), when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u32>,
    pub text: String,
    pub helpful_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}
