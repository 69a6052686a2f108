use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::anime::{AnimeRecord, CatalogReview, RankingKind};
use crate::catalog::{CachedCatalog, CatalogError};
use crate::filter::{self, FilterOutcome, FilterSpec, SortKey};
use crate::metrics::FILTER_MATCHES;

/// Results requested from the catalog for a title search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 12;
/// Size of the popularity listing that genre browsing filters locally.
pub const GENRE_POOL_SIZE: u32 = 100;
/// Entries in the trending (currently airing) listing.
pub const TRENDING_LIMIT: u32 = 10;
/// Genre sections shown on the home page.
pub const HOME_GENRE_SECTIONS: usize = 4;
/// Entries per home page genre section.
pub const HOME_SECTION_SIZE: usize = 10;
/// Catalog reviews shown with an anime's details.
pub const TOP_REVIEWS_LIMIT: u32 = 3;

/// Window applied after filtering and sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub offset: usize,
    /// Maximum items to return; `None` returns everything from `offset`.
    pub size: Option<usize>,
}

impl Page {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn first(size: usize) -> Self {
        Self {
            offset: 0,
            size: Some(size),
        }
    }
}

/// A filtered listing.
///
/// `data_unavailable` distinguishes "the catalog could not be reached" from
/// "nothing matched".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowseResult {
    pub items: Vec<AnimeRecord>,
    pub match_count: usize,
    pub data_unavailable: bool,
}

impl BrowseResult {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            match_count: 0,
            data_unavailable: false,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            data_unavailable: true,
            ..Self::empty()
        }
    }

    fn from_outcome(outcome: FilterOutcome) -> Self {
        Self {
            items: outcome.records,
            match_count: outcome.match_count,
            data_unavailable: false,
        }
    }
}

/// Details for one anime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsResult {
    pub anime: Option<AnimeRecord>,
    /// Most helpful catalog reviews; empty when the catalog has none or could
    /// not serve them.
    pub top_reviews: Vec<CatalogReview>,
    pub data_unavailable: bool,
}

impl DetailsResult {
    fn missing(data_unavailable: bool) -> Self {
        Self {
            anime: None,
            top_reviews: Vec::new(),
            data_unavailable,
        }
    }

    /// The catalog answered but has no such anime.
    pub fn is_not_found(&self) -> bool {
        self.anime.is_none() && !self.data_unavailable
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenreSection {
    pub genre: String,
    pub items: Vec<AnimeRecord>,
}

/// Everything the landing page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomePage {
    pub spotlight: Option<AnimeRecord>,
    pub trending: Vec<AnimeRecord>,
    pub genre_sections: Vec<GenreSection>,
    pub data_unavailable: bool,
}

/// Browsing over the cached catalog.
pub struct BrowseService {
    catalog: Arc<CachedCatalog>,
}

impl BrowseService {
    pub fn new(catalog: Arc<CachedCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<CachedCatalog> {
        &self.catalog
    }

    /// Title search with local filtering. A blank query never reaches the
    /// catalog.
    pub async fn search(
        &self,
        query: &str,
        limit: u32,
        spec: &FilterSpec,
        sort: SortKey,
        page: Page,
    ) -> BrowseResult {
        if query.trim().is_empty() {
            return BrowseResult::empty();
        }

        match self.catalog.search(query, limit).await {
            Ok(records) => finish("search", &records, spec, sort, page),
            Err(e) => unavailable("search", query, &e),
        }
    }

    /// Ranking listing with local filtering.
    pub async fn ranking(
        &self,
        kind: RankingKind,
        limit: u32,
        spec: &FilterSpec,
        sort: SortKey,
        page: Page,
    ) -> BrowseResult {
        match self.catalog.ranking(kind, limit).await {
            Ok(records) => finish("ranking", &records, spec, sort, page),
            Err(e) => unavailable("ranking", kind.as_str(), &e),
        }
    }

    /// Popular anime carrying `genre`, most popular first.
    ///
    /// The catalog cannot filter by genre, so the popularity listing is
    /// fetched and filtered here.
    pub async fn by_genre(&self, genre: &str, limit: usize) -> BrowseResult {
        let spec = FilterSpec::new().include_genre(genre);

        match self
            .catalog
            .ranking(RankingKind::ByPopularity, GENRE_POOL_SIZE)
            .await
        {
            Ok(records) => finish(
                "genre",
                &records,
                &spec,
                SortKey::PopularityDesc,
                Page::first(limit),
            ),
            Err(e) => unavailable("genre", genre, &e),
        }
    }

    /// Currently airing anime, in catalog order.
    pub async fn trending(&self, limit: u32) -> BrowseResult {
        match self.catalog.ranking(RankingKind::Airing, limit).await {
            Ok(records) => BrowseResult {
                match_count: records.len(),
                items: records.as_ref().clone(),
                data_unavailable: false,
            },
            Err(e) => unavailable("trending", "airing", &e),
        }
    }

    /// Details plus the catalog's most helpful reviews.
    ///
    /// Reviews are only requested once the anime is known to exist, and a
    /// failure there leaves the details intact.
    pub async fn details(&self, id: u64) -> DetailsResult {
        let anime = match self.catalog.details(id).await {
            Ok(anime) => anime.as_ref().clone(),
            Err(CatalogError::NotFound(_)) => {
                debug!("Anime {} not found in catalog", id);
                return DetailsResult::missing(false);
            }
            Err(e) => {
                warn!("Catalog details failed for anime {}: {}", id, e);
                return DetailsResult::missing(true);
            }
        };

        let top_reviews = match self.catalog.top_reviews(id, TOP_REVIEWS_LIMIT).await {
            Ok(reviews) => reviews.as_ref().clone(),
            Err(e) => {
                warn!("Catalog reviews failed for anime {}: {}", id, e);
                Vec::new()
            }
        };

        DetailsResult {
            anime: Some(anime),
            top_reviews,
            data_unavailable: false,
        }
    }

    /// Spotlight, trending listing and the most common genres of the
    /// popularity listing, each with its newest entries.
    pub async fn home(&self) -> HomePage {
        let (trending, popular) = futures::join!(
            self.trending(TRENDING_LIMIT),
            self.catalog.ranking(RankingKind::ByPopularity, GENRE_POOL_SIZE),
        );

        let (genre_sections, popular_unavailable) = match popular {
            Ok(records) => (genre_sections(&records), false),
            Err(e) => {
                warn!("Catalog ranking failed for home page: {}", e);
                (Vec::new(), true)
            }
        };

        HomePage {
            spotlight: trending.items.first().cloned(),
            data_unavailable: trending.data_unavailable || popular_unavailable,
            trending: trending.items,
            genre_sections,
        }
    }
}

fn finish(
    source: &str,
    records: &[AnimeRecord],
    spec: &FilterSpec,
    sort: SortKey,
    page: Page,
) -> BrowseResult {
    let outcome = filter::apply(records, spec, sort);
    FILTER_MATCHES
        .with_label_values(&[source])
        .observe(outcome.match_count as f64);
    debug!(
        "Filtered {} {} results down to {} (sort={})",
        records.len(),
        source,
        outcome.match_count,
        sort
    );

    BrowseResult::from_outcome(filter::paginate(outcome, page.offset, page.size))
}

fn unavailable(source: &str, request: &str, error: &CatalogError) -> BrowseResult {
    warn!("Catalog {} failed for '{}': {}", source, request, error);
    BrowseResult::unavailable()
}

fn genre_sections(records: &[AnimeRecord]) -> Vec<GenreSection> {
    filter::genre_counts(records)
        .into_iter()
        .take(HOME_GENRE_SECTIONS)
        .map(|(genre, _)| {
            let spec = FilterSpec::new().include_genre(&genre);
            let outcome = filter::apply(records, &spec, SortKey::DateDesc);
            let items = filter::paginate(outcome, 0, Some(HOME_SECTION_SIZE)).records;
            GenreSection { genre, items }
        })
        .collect()
}
