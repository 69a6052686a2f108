//! Anime browsing handlers.
//!
//! Catalog failures never turn into HTTP errors here: they surface as
//! `data_unavailable: true` on an otherwise successful response.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use anitrack_core::anime::KNOWN_GENRES;
use anitrack_core::browse::{DEFAULT_SEARCH_LIMIT, HOME_SECTION_SIZE, TRENDING_LIMIT};
use anitrack_core::{
    AnimeRecord, BrowseResult, CatalogReview, FilterParams, FilterSpec, HomePage, Page,
    RankingKind, Review, SortKey, WatchlistEntry,
};

use super::handlers::{api_error, library_error, ApiResult};
use super::middleware::CurrentIdentity;
use crate::state::AppState;

/// Ranking entries fetched when the request names no limit.
const DEFAULT_RANKING_LIMIT: u32 = 50;

// ============================================================================
// Request/Response types
// ============================================================================

/// Query string shared by search and ranking listings.
///
/// Every value is kept as text and parsed leniently: a malformed value means
/// "not set" rather than a 400.
#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub page_size: Option<String>,
    #[serde(flatten)]
    pub filter: FilterParams,
}

impl BrowseQuery {
    fn spec(&self) -> FilterSpec {
        FilterSpec::from_params(&self.filter)
    }

    fn sort(&self) -> SortKey {
        self.sort.as_deref().map(SortKey::parse).unwrap_or_default()
    }

    fn page(&self) -> Page {
        Page {
            offset: parse_number(self.offset.as_deref()).unwrap_or(0),
            size: parse_number(self.page_size.as_deref()),
        }
    }

    /// Limits above what the catalog serves are clamped by the cached
    /// catalog, before the cache key is built.
    fn limit(&self, default: u32) -> u32 {
        parse_number::<u32>(self.limit.as_deref())
            .filter(|limit| *limit > 0)
            .unwrap_or(default)
    }
}

fn parse_number<T: std::str::FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|raw| raw.trim().parse().ok())
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    #[serde(default)]
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenreInfo {
    pub name: String,
    pub id: u32,
}

#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub genres: Vec<GenreInfo>,
}

#[derive(Debug, Serialize)]
pub struct AnimeDetailsResponse {
    pub anime: Option<AnimeRecord>,
    pub data_unavailable: bool,
    /// Reviews written on this site, newest first.
    pub reviews: Vec<Review>,
    /// Most helpful reviews published on the catalog.
    pub catalog_reviews: Vec<CatalogReview>,
    /// Mean of local review ratings, if any.
    pub average_rating: Option<f64>,
    /// The caller's watchlist entry for this anime.
    pub watchlist_entry: Option<WatchlistEntry>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/anime/search
///
/// Title search followed by local filtering and sorting.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BrowseQuery>,
) -> Json<BrowseResult> {
    let query = params.q.as_deref().unwrap_or_default();
    let result = state
        .browse()
        .search(
            query,
            params.limit(DEFAULT_SEARCH_LIMIT),
            &params.spec(),
            params.sort(),
            params.page(),
        )
        .await;

    Json(result)
}

/// GET /api/v1/anime/ranking/{kind}
pub async fn ranking(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<BrowseQuery>,
) -> ApiResult<Json<BrowseResult>> {
    let kind = RankingKind::parse(&kind).ok_or_else(|| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Unknown ranking type: {}", kind),
        )
    })?;

    let result = state
        .browse()
        .ranking(
            kind,
            params.limit(DEFAULT_RANKING_LIMIT),
            &params.spec(),
            params.sort(),
            params.page(),
        )
        .await;

    Ok(Json(result))
}

/// GET /api/v1/anime/trending
pub async fn trending(State(state): State<Arc<AppState>>) -> Json<BrowseResult> {
    Json(state.browse().trending(TRENDING_LIMIT).await)
}

/// GET /api/v1/anime/home
pub async fn home(State(state): State<Arc<AppState>>) -> Json<HomePage> {
    Json(state.browse().home().await)
}

/// GET /api/v1/anime/genres
///
/// Genres offered for browsing.
pub async fn list_genres() -> Json<GenresResponse> {
    let genres = KNOWN_GENRES
        .iter()
        .map(|(name, id)| GenreInfo {
            name: name.to_string(),
            id: *id,
        })
        .collect();

    Json(GenresResponse { genres })
}

/// GET /api/v1/anime/genre/{name}
pub async fn by_genre(
    State(state): State<Arc<AppState>>,
    Path(genre): Path<String>,
    Query(params): Query<LimitQuery>,
) -> Json<BrowseResult> {
    let limit = parse_number::<usize>(params.limit.as_deref())
        .filter(|limit| *limit > 0)
        .unwrap_or(HOME_SECTION_SIZE);

    Json(state.browse().by_genre(&genre, limit).await)
}

/// GET /api/v1/anime/{id}
///
/// Catalog details and top catalog reviews, plus local reviews and, for a
/// signed-in caller, their watchlist entry.
pub async fn get_anime(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    CurrentIdentity(identity): CurrentIdentity,
) -> ApiResult<Json<AnimeDetailsResponse>> {
    let details = state.browse().details(id).await;
    if details.is_not_found() {
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Anime not found: {}", id),
        ));
    }

    let library = state.library();
    let reviews = library.list_reviews(id).map_err(library_error)?;
    let watchlist_entry = match identity.user_id {
        Some(user_id) => library
            .get_watchlist_entry(user_id, id)
            .map_err(library_error)?,
        None => None,
    };

    Ok(Json(AnimeDetailsResponse {
        anime: details.anime,
        data_unavailable: details.data_unavailable,
        catalog_reviews: details.top_reviews,
        average_rating: average_rating(&reviews),
        reviews,
        watchlist_entry,
    }))
}

fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }
    let total: u32 = reviews.iter().map(|r| r.rating as u32).sum();
    Some(total as f64 / reviews.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> BrowseQuery {
        let encoded = pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let uri: axum::http::Uri = format!("/x?{}", encoded).parse().unwrap();
        Query::<BrowseQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_browse_query_defaults() {
        let params = query(&[]);
        assert_eq!(params.sort(), SortKey::ScoreDesc);
        assert_eq!(params.page(), Page::all());
        assert_eq!(params.limit(12), 12);
        assert!(params.spec().is_empty());
    }

    #[test]
    fn test_browse_query_parses_filters_and_paging() {
        let params = query(&[
            ("q", "naruto"),
            ("genres", "Action,Drama"),
            ("min_score", "8.5"),
            ("sort", "title_asc"),
            ("offset", "5"),
            ("page_size", "10"),
            ("limit", "30"),
        ]);

        assert_eq!(params.q.as_deref(), Some("naruto"));
        assert_eq!(params.sort(), SortKey::TitleAsc);
        assert_eq!(
            params.page(),
            Page {
                offset: 5,
                size: Some(10)
            }
        );
        assert_eq!(params.limit(12), 30);

        let spec = params.spec();
        assert!(spec.genre_include.contains("action"));
        assert!(spec.genre_include.contains("drama"));
        assert_eq!(spec.min_score, Some(8.5));
    }

    #[test]
    fn test_browse_query_is_lenient() {
        let params = query(&[
            ("year", "abc"),
            ("offset", "-3"),
            ("limit", "0"),
            ("sort", "sideways"),
            ("unknown", "1"),
        ]);

        assert!(params.spec().is_empty());
        assert_eq!(params.page().offset, 0);
        assert_eq!(params.limit(12), 12);
        assert_eq!(params.sort(), SortKey::ScoreDesc);
    }

    #[test]
    fn test_limit_overflow_falls_back_to_default() {
        assert_eq!(query(&[("limit", "99999999999")]).limit(12), 12);
    }

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), None);

        let review = |rating: u8| Review {
            id: rating as i64,
            user_id: 1,
            username: "jet".to_string(),
            anime_id: 1,
            rating,
            text: String::new(),
            review_date: chrono::Utc::now(),
        };
        assert_eq!(average_rating(&[review(7), review(10)]), Some(8.5));
    }
}
