use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Auth section exists (enforced by serde)
/// - Server port is not 0
/// - Cache TTL and size bound are positive
/// - Catalog client id is set when a catalog section is present
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Cache validation
    if config.cache.ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "cache.ttl_secs must be greater than 0".to_string(),
        ));
    }
    if config.cache.max_entries == Some(0) {
        return Err(ConfigError::ValidationError(
            "cache.max_entries must be greater than 0".to_string(),
        ));
    }

    // Catalog validation
    if let Some(catalog) = &config.catalog {
        if catalog.client_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "catalog.client_id cannot be empty".to_string(),
            ));
        }
        if catalog.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "catalog.timeout_secs must be greater than 0".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AuthConfig, AuthMethod, CacheConfig, CatalogConfig, DatabaseConfig, ServerConfig,
    };
    use std::net::IpAddr;

    fn valid_config() -> Config {
        Config {
            auth: AuthConfig {
                method: AuthMethod::Token,
            },
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cache: CacheConfig::default(),
            catalog: Some(CatalogConfig {
                client_id: "client".to_string(),
                base_url: None,
                timeout_secs: 10,
            }),
        }
    }

    fn assert_invalid(config: &Config) {
        let result = validate_config(config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_without_catalog_is_ok() {
        let mut config = valid_config();
        config.catalog = None;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
        };
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_zero_ttl_fails() {
        let mut config = valid_config();
        config.cache.ttl_secs = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_zero_max_entries_fails() {
        let mut config = valid_config();
        config.cache.max_entries = Some(0);
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_blank_client_id_fails() {
        let mut config = valid_config();
        if let Some(catalog) = config.catalog.as_mut() {
            catalog.client_id = "   ".to_string();
        }
        assert_invalid(&config);
    }
}
