//! Testing utilities and mock implementations.
//!
//! The mock catalog stands in for MyAnimeList so browse and API tests run
//! without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use anitrack_core::testing::{fixtures, MockCatalog};
//!
//! let catalog = MockCatalog::new();
//! catalog.add_all(fixtures::sample_records()).await;
//! catalog.set_next_error(CatalogError::RateLimitExceeded).await;
//!
//! // Use in AppState...
//! ```

mod mock_catalog;

pub use mock_catalog::{MockCatalog, RecordedCatalogQuery};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::anime::{AnimeRecord, CatalogReview};

    /// Create an anime with the given scoring fields and genres.
    pub fn anime(
        id: u64,
        title: &str,
        score: Option<f64>,
        year: Option<i32>,
        genres: &[&str],
    ) -> AnimeRecord {
        let mut record = AnimeRecord::new(id, title);
        record.mean_score = score;
        record.release_year = year;
        record.start_date = year.map(|y| format!("{}-04-01", y));
        record.genres = genres.iter().map(|g| g.to_string()).collect();
        record
    }

    /// Create a fully populated TV anime with reasonable defaults.
    pub fn sample_record(id: u64, title: &str) -> AnimeRecord {
        let mut record = anime(id, title, Some(8.0), Some(2010), &["Action"]);
        record.media_type = Some("tv".to_string());
        record.episode_count = Some(24);
        record.synopsis = Some(format!("A story about {}.", title.to_lowercase()));
        record.poster_url = Some(format!("https://cdn.myanimelist.net/images/anime/{}.jpg", id));
        record.popularity_rank = Some(id as u32);
        record.studios.insert("Studio Test".to_string());
        record
    }

    /// Two catalog reviews, most helpful first.
    pub fn sample_catalog_reviews() -> Vec<CatalogReview> {
        vec![
            CatalogReview {
                reviewer: "alphonse".to_string(),
                rating: Some(10),
                text: "A complete story with no filler.".to_string(),
                helpful_count: 120,
                date: Some("2010-07-05".to_string()),
            },
            CatalogReview {
                reviewer: "winry".to_string(),
                rating: Some(9),
                text: "The automail alone is worth it.".to_string(),
                helpful_count: 80,
                date: None,
            },
        ]
    }

    /// A small, varied catalog.
    pub fn sample_records() -> Vec<AnimeRecord> {
        let mut fmab = anime(
            5114,
            "Fullmetal Alchemist: Brotherhood",
            Some(9.1),
            Some(2009),
            &["Action", "Adventure", "Drama", "Fantasy"],
        );
        fmab.media_type = Some("tv".to_string());
        fmab.popularity_rank = Some(3);
        fmab.episode_count = Some(64);

        let mut steins_gate = anime(
            9253,
            "Steins;Gate",
            Some(9.07),
            Some(2011),
            &["Drama", "Sci-Fi", "Suspense"],
        );
        steins_gate.media_type = Some("tv".to_string());
        steins_gate.popularity_rank = Some(13);
        steins_gate.episode_count = Some(24);

        let mut your_name = anime(
            32281,
            "Kimi no Na wa.",
            Some(8.83),
            Some(2016),
            &["Award Winning", "Drama", "Romance", "Supernatural"],
        );
        your_name.media_type = Some("movie".to_string());
        your_name.popularity_rank = Some(12);
        your_name.episode_count = Some(1);

        let mut bebop = anime(
            1,
            "Cowboy Bebop",
            Some(8.75),
            Some(1998),
            &["Action", "Award Winning", "Sci-Fi"],
        );
        bebop.media_type = Some("tv".to_string());
        bebop.popularity_rank = Some(43);
        bebop.episode_count = Some(26);

        let mut k_on = anime(5680, "K-On!", Some(7.86), Some(2009), &["Comedy"]);
        k_on.media_type = Some("tv".to_string());
        k_on.popularity_rank = Some(253);
        k_on.episode_count = Some(13);

        let mut unscored = anime(60000, "Untitled Upcoming Project", None, None, &["Action"]);
        unscored.media_type = Some("ona".to_string());

        vec![fmab, steins_gate, your_name, bebop, k_on, unscored]
    }
}
