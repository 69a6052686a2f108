//! Presentation-facing browsing: cached catalog reads plus local filtering.

mod service;

pub use service::{
    BrowseResult, BrowseService, DetailsResult, GenreSection, HomePage, Page,
    DEFAULT_SEARCH_LIMIT, GENRE_POOL_SIZE, HOME_GENRE_SECTIONS, HOME_SECTION_SIZE, TOP_REVIEWS_LIMIT,
    TRENDING_LIMIT,
};
