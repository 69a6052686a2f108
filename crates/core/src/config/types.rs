use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Remote catalog. Without it every browse request reports missing data.
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub method: AuthMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    /// Every caller is anonymous; library endpoints are unreachable.
    None,
    /// Per-user bearer tokens issued at registration.
    Token,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::None => "none",
            AuthMethod::Token => "token",
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("anitrack.db")
}

/// Response cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Seconds a catalog response stays fresh (default: 300)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Upper bound on entries per cache (default: unbounded)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            max_entries: None,
        }
    }
}

fn default_ttl_secs() -> u64 {
    300
}

/// MyAnimeList catalog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// MyAnimeList API client id
    pub client_id: String,
    /// Base URL (default: https://api.myanimelist.net/v2)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 10)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    10
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub auth: SanitizedAuthConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<SanitizedCatalogConfig>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedAuthConfig {
    pub method: String,
}

/// Sanitized catalog config (client id hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub client_id_configured: bool,
    pub timeout_secs: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            auth: SanitizedAuthConfig {
                method: config.auth.method.as_str().to_string(),
            },
            server: config.server.clone(),
            database: config.database.clone(),
            cache: config.cache.clone(),
            catalog: config.catalog.as_ref().map(|c| SanitizedCatalogConfig {
                base_url: c.base_url.clone(),
                client_id_configured: !c.client_id.is_empty(),
                timeout_secs: c.timeout_secs,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_config() -> Config {
        Config {
            auth: AuthConfig {
                method: AuthMethod::None,
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            catalog: None,
        }
    }

    #[test]
    fn test_deserialize_valid_config_with_none_auth() {
        let toml = r#"
[auth]
method = "none"

[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.auth.method, AuthMethod::None);
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
    }

    #[test]
    fn test_deserialize_token_auth() {
        let toml = r#"
[auth]
method = "token"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.auth.method, AuthMethod::Token);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let toml = r#"
[auth]
method = "none"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.database.path.to_str().unwrap(), "anitrack.db");
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.cache.max_entries, None);
        assert!(config.catalog.is_none());
    }

    #[test]
    fn test_deserialize_missing_auth_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_with_cache_and_catalog() {
        let toml = r#"
[auth]
method = "token"

[cache]
ttl_secs = 60
max_entries = 500

[catalog]
client_id = "abc123"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.max_entries, Some(500));

        let catalog = config.catalog.as_ref().unwrap();
        assert_eq!(catalog.client_id, "abc123");
        assert_eq!(catalog.base_url, None);
        assert_eq!(catalog.timeout_secs, 10); // default
    }

    #[test]
    fn test_sanitized_config() {
        let config = minimal_config();
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.auth.method, "none");
        assert_eq!(sanitized.server.port, 8080);
        assert_eq!(sanitized.database.path.to_str().unwrap(), "anitrack.db");
        assert!(sanitized.catalog.is_none());
    }

    #[test]
    fn test_sanitized_config_hides_client_id() {
        let mut config = minimal_config();
        config.catalog = Some(CatalogConfig {
            client_id: "secret-client-id".to_string(),
            base_url: Some("http://localhost:9999".to_string()),
            timeout_secs: 5,
        });

        let sanitized = SanitizedConfig::from(&config);
        let catalog = sanitized.catalog.as_ref().unwrap();
        assert!(catalog.client_id_configured);
        assert_eq!(catalog.timeout_secs, 5);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-client-id"));
    }
}
