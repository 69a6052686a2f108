//! Filter and sort parameters.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::anime::{AnimeRecord, MediaType};

/// Declarative constraints applied to a sequence of records.
///
/// Every field is optional; an empty spec lets everything through. Genre
/// names are stored lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Every listed genre must be present.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub genre_include: BTreeSet<String>,
    /// None of the listed genres may be present.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub genre_exclude: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<MediaType>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_genre(mut self, genre: &str) -> Self {
        self.genre_include.insert(genre.trim().to_lowercase());
        self
    }

    pub fn exclude_genre(mut self, genre: &str) -> Self {
        self.genre_exclude.insert(genre.trim().to_lowercase());
        self
    }

    pub fn year_range(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.min_year = min;
        self.max_year = max;
        self
    }

    pub fn min_score(mut self, score: f64) -> Self {
        self.min_score = Some(score);
        self
    }

    pub fn media_type(mut self, media_type: MediaType) -> Self {
        self.media_type = Some(media_type);
        self
    }

    /// True when no constraint is active.
    pub fn is_empty(&self) -> bool {
        self.genre_include.is_empty()
            && self.genre_exclude.is_empty()
            && self.min_year.is_none()
            && self.max_year.is_none()
            && self.min_score.is_none()
            && self.media_type.is_none()
    }

    /// Build a spec from raw query-string values.
    ///
    /// Malformed values are dropped rather than rejected: a bad year or score
    /// simply leaves that constraint inactive.
    pub fn from_params(params: &FilterParams) -> Self {
        let mut spec = Self {
            genre_include: split_genres(params.genres.as_deref()),
            genre_exclude: split_genres(params.exclude_genres.as_deref()),
            min_year: parse_year(params.min_year.as_deref()),
            max_year: parse_year(params.max_year.as_deref()),
            min_score: parse_score(params.min_score.as_deref()),
            media_type: params.media_type.as_deref().and_then(MediaType::parse),
        };

        if let Some(year) = parse_year(params.year.as_deref()) {
            spec.min_year = Some(year);
            spec.max_year = Some(year);
        }

        spec
    }

    /// Whether a record satisfies every active constraint.
    ///
    /// A record lacking a field that an active constraint looks at does not
    /// match.
    pub fn matches(&self, record: &AnimeRecord) -> bool {
        if let Some(media_type) = self.media_type {
            match record.media_type.as_deref() {
                Some(reported) if media_type.matches(reported) => {}
                _ => return false,
            }
        }

        if self.min_year.is_some() || self.max_year.is_some() {
            let Some(year) = record.release_year else {
                return false;
            };
            if self.min_year.is_some_and(|min| year < min) {
                return false;
            }
            if self.max_year.is_some_and(|max| year > max) {
                return false;
            }
        }

        if let Some(min_score) = self.min_score {
            match record.mean_score {
                Some(score) if score >= min_score => {}
                _ => return false,
            }
        }

        if !self.genre_include.is_empty() || !self.genre_exclude.is_empty() {
            let genres: BTreeSet<String> =
                record.genres.iter().map(|g| g.to_lowercase()).collect();

            if !self.genre_include.is_subset(&genres) {
                return false;
            }
            if !self.genre_exclude.is_disjoint(&genres) {
                return false;
            }
        }

        true
    }
}

/// Raw filter values as they arrive from a query string.
///
/// Unknown keys are ignored by the deserializer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterParams {
    /// Comma-separated genres that must all be present.
    pub genres: Option<String>,
    /// Comma-separated genres that must all be absent.
    pub exclude_genres: Option<String>,
    /// Exact release year; overrides `min_year` and `max_year`.
    pub year: Option<String>,
    pub min_year: Option<String>,
    pub max_year: Option<String>,
    pub min_score: Option<String>,
    pub media_type: Option<String>,
}

fn split_genres(raw: Option<&str>) -> BTreeSet<String> {
    raw.map(|raw| {
        raw.split(',')
            .map(|g| g.trim().to_lowercase())
            .filter(|g| !g.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn parse_year(raw: Option<&str>) -> Option<i32> {
    raw.and_then(|raw| raw.trim().parse().ok())
}

fn parse_score(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|score| score.is_finite())
}

/// Ordering applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    ScoreDesc,
    ScoreAsc,
    TitleAsc,
    TitleDesc,
    /// Most popular first (lowest popularity rank).
    PopularityDesc,
    PopularityAsc,
    /// Newest first.
    DateDesc,
    DateAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 8] = [
        SortKey::ScoreDesc,
        SortKey::ScoreAsc,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
        SortKey::PopularityDesc,
        SortKey::PopularityAsc,
        SortKey::DateDesc,
        SortKey::DateAsc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::ScoreDesc => "score_desc",
            SortKey::ScoreAsc => "score_asc",
            SortKey::TitleAsc => "title_asc",
            SortKey::TitleDesc => "title_desc",
            SortKey::PopularityDesc => "popularity_desc",
            SortKey::PopularityAsc => "popularity_asc",
            SortKey::DateDesc => "date_desc",
            SortKey::DateAsc => "date_asc",
        }
    }

    /// Parse a sort name, falling back to the default for anything unknown.
    pub fn parse(value: &str) -> Self {
        let value = value.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .unwrap_or_default()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
