//! MyAnimeList v2 API client.
//!
//! Public read endpoints only need a client id, sent in the
//! `X-MAL-CLIENT-ID` header.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{AnimeCatalog, CatalogError, MAX_RANKING_LIMIT, MAX_REVIEWS_LIMIT, MAX_SEARCH_LIMIT};
use crate::anime::{year_from_date, AnimeRecord, CatalogReview, RankingKind};
use crate::config::CatalogConfig;
use crate::metrics::{CATALOG_REQUESTS, CATALOG_REQUEST_DURATION};

const DEFAULT_BASE_URL: &str = "https://api.myanimelist.net/v2";
const CLIENT_ID_HEADER: &str = "X-MAL-CLIENT-ID";

/// Fields requested for search and ranking listings.
const LIST_FIELDS: &str =
    "id,title,main_picture,synopsis,mean,genres,start_date,popularity,media_type,num_episodes,studios";

/// Fields requested for a single anime.
const DETAIL_FIELDS: &str = "id,title,main_picture,alternative_titles,start_date,end_date,synopsis,mean,rank,popularity,num_episodes,genres,studios,status,average_episode_duration,rating,media_type";

/// MyAnimeList API client.
pub struct MalClient {
    client: Client,
    base_url: String,
    client_id: String,
}

impl MalClient {
    /// Create a new MyAnimeList client.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        if config.client_id.trim().is_empty() {
            return Err(CatalogError::NotConfigured(
                "MyAnimeList client id is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.into()))
            .build()?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            client_id: config.client_id.clone(),
        })
    }

    /// Issue a GET request and decode the JSON body, mapping HTTP failures
    /// to catalog errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let timer = CATALOG_REQUEST_DURATION
            .with_label_values(&[operation])
            .start_timer();
        let result = self.send(path, query).await;
        timer.observe_duration();

        let status = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        CATALOG_REQUESTS
            .with_label_values(&[operation, status])
            .inc();
        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header(CLIENT_ID_HEADER, &self.client_id)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CatalogError::NotConfigured(
                "Invalid MyAnimeList client id".to_string(),
            ));
        }
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(path.to_string()));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(format!("Failed to parse {} response: {}", path, e)))
    }
}

#[async_trait]
impl AnimeCatalog for MalClient {
    async fn search(&self, query: &str, limit: u32) -> Result<Vec<AnimeRecord>, CatalogError> {
        debug!("MAL search: query='{}', limit={}", query, limit);

        let response: MalListResponse = self
            .get_json(
                "search",
                "/anime",
                &[
                    ("q", query.to_string()),
                    ("limit", limit.clamp(1, MAX_SEARCH_LIMIT).to_string()),
                    ("fields", LIST_FIELDS.to_string()),
                ],
            )
            .await?;

        Ok(response.into_records())
    }

    async fn get_ranking(
        &self,
        kind: RankingKind,
        limit: u32,
    ) -> Result<Vec<AnimeRecord>, CatalogError> {
        debug!("MAL ranking: kind={}, limit={}", kind, limit);

        let response: MalListResponse = self
            .get_json(
                "ranking",
                "/anime/ranking",
                &[
                    ("ranking_type", kind.as_str().to_string()),
                    ("limit", limit.clamp(1, MAX_RANKING_LIMIT).to_string()),
                    ("fields", LIST_FIELDS.to_string()),
                ],
            )
            .await?;

        Ok(response.into_records())
    }

    async fn get_details(&self, id: u64) -> Result<AnimeRecord, CatalogError> {
        debug!("MAL get anime: id={}", id);

        let anime: MalAnime = self
            .get_json(
                "details",
                &format!("/anime/{}", id),
                &[("fields", DETAIL_FIELDS.to_string())],
            )
            .await
            .map_err(|e| match e {
                CatalogError::NotFound(_) => CatalogError::NotFound(format!("Anime ID {}", id)),
                other => other,
            })?;

        Ok(anime.into())
    }

    async fn get_top_reviews(
        &self,
        id: u64,
        limit: u32,
    ) -> Result<Vec<CatalogReview>, CatalogError> {
        debug!("MAL reviews: id={}, limit={}", id, limit);

        let response: MalReviewsResponse = self
            .get_json(
                "reviews",
                &format!("/anime/{}/reviews", id),
                &[
                    ("limit", limit.clamp(1, MAX_REVIEWS_LIMIT).to_string()),
                    ("sort", "helpful".to_string()),
                ],
            )
            .await?;

        Ok(response
            .data
            .into_iter()
            .map(|item| item.node.into())
            .collect())
    }
}

// ============================================================================
// MAL API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
struct MalListResponse {
    #[serde(default)]
    data: Vec<MalListItem>,
}

impl MalListResponse {
    fn into_records(self) -> Vec<AnimeRecord> {
        self.data.into_iter().map(|item| item.node.into()).collect()
    }
}

#[derive(Debug, Deserialize)]
struct MalListItem {
    node: MalAnime,
}

#[derive(Debug, Deserialize)]
struct MalAnime {
    id: u64,
    title: String,
    main_picture: Option<MalPicture>,
    alternative_titles: Option<MalAlternativeTitles>,
    start_date: Option<String>,
    end_date: Option<String>,
    synopsis: Option<String>,
    mean: Option<f64>,
    rank: Option<u32>,
    popularity: Option<u32>,
    num_episodes: Option<u32>,
    #[serde(default)]
    genres: Vec<MalNamed>,
    #[serde(default)]
    studios: Vec<MalNamed>,
    media_type: Option<String>,
    status: Option<String>,
    average_episode_duration: Option<u32>,
    rating: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MalPicture {
    medium: Option<String>,
    large: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MalAlternativeTitles {
    en: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MalNamed {
    name: String,
}

#[derive(Debug, Deserialize)]
struct MalReviewsResponse {
    #[serde(default)]
    data: Vec<MalReviewItem>,
}

#[derive(Debug, Deserialize)]
struct MalReviewItem {
    node: MalReview,
}

#[derive(Debug, Deserialize)]
struct MalReview {
    user: Option<MalReviewer>,
    rating: Option<u32>,
    #[serde(default)]
    review: String,
    #[serde(default)]
    helpful_count: u32,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MalReviewer {
    name: Option<String>,
}

// ============================================================================
// Conversions
// ============================================================================

/// MAL uses empty strings and zeroes for "unknown".
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_zero(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v > 0)
}

fn names(values: Vec<MalNamed>) -> BTreeSet<String> {
    values
        .into_iter()
        .map(|v| v.name)
        .filter(|name| !name.is_empty())
        .collect()
}

impl From<MalAnime> for AnimeRecord {
    fn from(a: MalAnime) -> Self {
        let start_date = non_empty(a.start_date);
        let poster_url = a
            .main_picture
            .and_then(|p| non_empty(p.medium).or_else(|| non_empty(p.large)));

        Self {
            id: a.id,
            title: a.title,
            media_type: non_empty(a.media_type),
            release_year: start_date.as_deref().and_then(year_from_date),
            episode_count: non_zero(a.num_episodes),
            synopsis: non_empty(a.synopsis),
            poster_url,
            mean_score: a.mean,
            popularity_rank: non_zero(a.popularity),
            genres: names(a.genres),
            studios: names(a.studios),
            english_title: a.alternative_titles.and_then(|t| non_empty(t.en)),
            status: non_empty(a.status),
            rank: non_zero(a.rank),
            start_date,
            end_date: non_empty(a.end_date),
            age_rating: non_empty(a.rating),
            average_episode_duration_secs: non_zero(a.average_episode_duration),
        }
    }
}

impl From<MalReview> for CatalogReview {
    fn from(r: MalReview) -> Self {
        Self {
            reviewer: r
                .user
                .and_then(|u| non_empty(u.name))
                .unwrap_or_else(|| "Anonymous".to_string()),
            rating: non_zero(r.rating),
            text: r.review,
            helpful_count: r.helpful_count,
            date: non_empty(r.date),
        }
    }
}
