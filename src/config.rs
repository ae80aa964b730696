//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    pub log_format: LogFormat,

    /// Lowercase hex SHA-256 digests of accepted API keys; empty disables auth
    pub api_key_hashes: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS"))?;

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidValue("PORT"))?;

        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "development".to_string());

        let log_format = match lookup("LOG_FORMAT")
            .unwrap_or_else(|| "pretty".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => return Err(ConfigError::InvalidValue("LOG_FORMAT")),
        };

        let api_key_hashes = parse_key_hashes(&lookup("API_KEY_HASHES").unwrap_or_default())?;

        let config = Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            log_format,
            api_key_hashes,
        };

        if config.is_production() && config.api_key_hashes.is_empty() {
            return Err(ConfigError::MissingEnv("API_KEY_HASHES"));
        }

        Ok(config)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_key_hashes(raw: &str) -> Result<Vec<String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|digest| {
            let digest = digest.to_ascii_lowercase();
            if digest.len() == 64 && digest.chars().all(|c| c.is_ascii_hexdigit()) {
                Ok(digest)
            } else {
                Err(ConfigError::InvalidValue("API_KEY_HASHES"))
            }
        })
        .collect()
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const DIGEST: &str = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/crm")]).unwrap();
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.api_key_hashes.is_empty());
        assert!(!config.is_production());
    }

    #[test]
    fn test_missing_database_url() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingEnv("DATABASE_URL"))));
    }

    #[test]
    fn test_invalid_port() {
        let result = load(&[("DATABASE_URL", "postgres://x"), ("PORT", "eighty")]);
        assert!(matches!(result, Err(ConfigError::InvalidValue("PORT"))));
    }

    #[test]
    fn test_key_hashes_parsed_and_lowercased() {
        let upper = DIGEST.to_ascii_uppercase();
        let hashes = format!(" {upper} , ,{DIGEST}");
        let config = load(&[("DATABASE_URL", "postgres://x"), ("API_KEY_HASHES", &hashes)]).unwrap();
        assert_eq!(config.api_key_hashes, vec![DIGEST.to_string(), DIGEST.to_string()]);
    }

    #[test]
    fn test_malformed_key_hash() {
        let result = load(&[("DATABASE_URL", "postgres://x"), ("API_KEY_HASHES", "abc123")]);
        assert!(matches!(result, Err(ConfigError::InvalidValue("API_KEY_HASHES"))));
    }

    #[test]
    fn test_production_requires_api_keys() {
        let result = load(&[("DATABASE_URL", "postgres://x"), ("ENVIRONMENT", "production")]);
        assert!(matches!(result, Err(ConfigError::MissingEnv("API_KEY_HASHES"))));

        let config = load(&[
            ("DATABASE_URL", "postgres://x"),
            ("ENVIRONMENT", "production"),
            ("API_KEY_HASHES", DIGEST),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert!(config.is_production());
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
