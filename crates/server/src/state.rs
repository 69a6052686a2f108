use std::sync::Arc;

use anitrack_core::{
    Authenticator, BrowseService, CachedCatalog, Config, LibraryStore, SanitizedConfig,
};

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    library: Arc<dyn LibraryStore>,
    browse: BrowseService,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        library: Arc<dyn LibraryStore>,
        catalog: Arc<CachedCatalog>,
    ) -> Self {
        Self {
            config,
            authenticator,
            library,
            browse: BrowseService::new(catalog),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    pub fn library(&self) -> &dyn LibraryStore {
        self.library.as_ref()
    }

    pub fn browse(&self) -> &BrowseService {
        &self.browse
    }

    /// The cached catalog behind the browse service.
    pub fn catalog(&self) -> &Arc<CachedCatalog> {
        self.browse.catalog()
    }
}
