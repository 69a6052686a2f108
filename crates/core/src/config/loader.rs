use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of the variables that override file settings. Nested keys are
/// joined with a double underscore so that keys containing `_` stay
/// reachable: `ANITRACK_CACHE__TTL_SECS=60` sets `cache.ttl_secs`.
const ENV_PREFIX: &str = "ANITRACK_";

/// Conventional variable holding the MyAnimeList client id.
const CLIENT_ID_VAR: &str = "MAL_CLIENT_ID";

/// Where environment overrides are read from.
struct EnvSources<'a> {
    prefix: &'a str,
    client_id_var: &'a str,
}

const PROCESS_ENV: EnvSources<'static> = EnvSources {
    prefix: ENV_PREFIX,
    client_id_var: CLIENT_ID_VAR,
};

/// Load configuration from a TOML file, then apply environment overrides.
///
/// Precedence, lowest first: the file, `MAL_CLIENT_ID`, `ANITRACK_*`.
/// Setting `MAL_CLIENT_ID` alone is enough to enable the catalog.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_with_env(path, &PROCESS_ENV)
}

fn load_with_env(path: &Path, env: &EnvSources<'_>) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(
            Env::raw()
                .only(&[env.client_id_var])
                .map(|_| "catalog.client_id".into()),
        )
        .merge(Env::prefixed(env.prefix).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Parse configuration from a TOML string, without environment overrides.
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}
