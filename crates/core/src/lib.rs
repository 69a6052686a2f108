pub mod anime;
pub mod auth;
pub mod browse;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod filter;
pub mod library;
pub mod metrics;
pub mod testing;

pub use anime::{AnimeRecord, CatalogReview, MediaType, RankingKind};
pub use auth::{
    create_authenticator, AuthError, AuthRequest, Authenticator, Identity, NoneAuthenticator,
    UserTokenAuthenticator,
};
pub use browse::{BrowseResult, BrowseService, DetailsResult, GenreSection, HomePage, Page};
pub use cache::{CacheKey, CacheStats, Clock, ManualClock, SystemClock, TtlCache};
pub use catalog::{AnimeCatalog, CachedCatalog, CatalogError, MalClient, UnconfiguredCatalog};
pub use config::{
    load_config, load_config_from_str, validate_config, AuthMethod, CacheConfig, CatalogConfig,
    Config, ConfigError, SanitizedConfig,
};
pub use filter::{FilterParams, FilterSpec, SortKey};
pub use library::{
    LibraryError, LibraryStore, Review, SqliteLibraryStore, User, WatchStatus, WatchlistEntry,
};
