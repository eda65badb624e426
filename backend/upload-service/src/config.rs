// backend/upload-service/src/config.rs

use std::env;

/// Upper bound on the whole multipart body: 10 MiB
pub const MAX_FORM_BYTES: usize = 10 << 20;

/// Prefix used when the form carries no `directory` value
pub const DEFAULT_DIRECTORY: &str = "uploads";

/// Application configuration, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Explicit region; `None` leaves resolution to the AWS default chain
    pub region: Option<String>,
    /// Target bucket. Not validated here, an empty bucket fails on first put.
    pub bucket: String,
    /// When set, public URLs are `{public_base_url}/{key}` instead of virtual-hosted S3 URLs
    pub public_base_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => 8000,
        };

        let config = Config {
            server: ServerConfig {
                host: non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
            },
            storage: StorageConfig {
                region: non_empty("AWS_REGION"),
                bucket: lookup("AWS_BUCKET").unwrap_or_default(),
                public_base_url: non_empty("PUBLIC_BASE_URL"),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidPort("0".to_string()));
        }

        if let Some(base) = &self.storage.public_base_url {
            if !base.starts_with("http://") && !base.starts_with("https://") {
                return Err(ConfigError::InvalidConfig(format!(
                    "PUBLIC_BASE_URL must be an http(s) URL, got {}",
                    base
                )));
            }
        }

        Ok(())
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.storage.region, None);
        assert_eq!(config.storage.bucket, "");
        assert_eq!(config.storage.public_base_url, None);
    }

    #[test]
    fn test_reads_storage_variables() {
        let config = load(&[
            ("AWS_REGION", "eu-west-1"),
            ("AWS_BUCKET", "media"),
            ("PORT", "9090"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.storage.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.storage.bucket, "media");
    }

    #[test]
    fn test_empty_port_falls_back_to_default() {
        let config = load(&[("PORT", "")]).unwrap();
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(load(&[("PORT", "http")]), Err(ConfigError::InvalidPort(_))));
        assert!(matches!(load(&[("PORT", "0")]), Err(ConfigError::InvalidPort(_))));
    }

    #[test]
    fn test_public_base_url_must_be_http() {
        assert!(load(&[("PUBLIC_BASE_URL", "cdn.example.com")]).is_err());
        assert!(load(&[("PUBLIC_BASE_URL", "https://cdn.example.com")]).is_ok());
    }

    #[test]
    fn test_form_ceiling() {
        assert_eq!(MAX_FORM_BYTES, 10 * 1024 * 1024);
    }
}
