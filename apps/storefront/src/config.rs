//! Storefront configuration module.
//!
//! Configuration is layered with the `config` crate:
//!
//! ```text
//! built-in defaults
//!      │
//!      ▼
//! dentica.toml (optional; path overridable with DENTICA_CONFIG)
//!      │
//!      ▼
//! DENTICA__SECTION__KEY environment variables   e.g. DENTICA__SERVER__PORT=9000
//! ```

use std::env;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "dentica.toml";

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "DENTICA_CONFIG";

/// Storefront configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pages: PagesConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,

    /// HTTP port
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path (`:memory:` for throwaway runs)
    pub path: String,

    /// Pool size
    pub max_connections: u32,

    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

/// Storefront page routes the API points clients at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PagesConfig {
    /// Where `GET /api/checkout` redirects when the cart is empty
    pub cart_path: String,

    /// Order confirmation page; receives `?orderId=`
    pub confirmation_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Page size when `limit` is absent
    pub default_limit: u32,

    /// Upper bound on `limit`
    pub max_limit: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseConfig {
                path: "./data/dentica.db".to_string(),
                max_connections: 5,
                run_migrations: true,
            },
            pages: PagesConfig {
                cart_path: "/cart".to_string(),
                confirmation_path: "/order-confirmation".to_string(),
            },
            catalog: CatalogConfig {
                default_limit: dentica_core::DEFAULT_LIST_LIMIT,
                max_limit: dentica_core::MAX_LIST_LIMIT,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from `DENTICA_CONFIG` (or `dentica.toml`) and the
    /// environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self::load_from(&path)
    }

    /// Load configuration with an explicit (optional) file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let config: AppConfig = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default("database.path", defaults.database.path)?
            .set_default(
                "database.max_connections",
                i64::from(defaults.database.max_connections),
            )?
            .set_default("database.run_migrations", defaults.database.run_migrations)?
            .set_default("pages.cart_path", defaults.pages.cart_path)?
            .set_default("pages.confirmation_path", defaults.pages.confirmation_path)?
            .set_default("catalog.default_limit", i64::from(defaults.catalog.default_limit))?
            .set_default("catalog.max_limit", i64::from(defaults.catalog.max_limit))?
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(
                Environment::with_prefix("DENTICA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        for (key, path) in [
            ("pages.cart_path", &self.pages.cart_path),
            ("pages.confirmation_path", &self.pages.confirmation_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must start with '/': {}",
                    key, path
                )));
            }
        }

        if self.catalog.default_limit == 0 || self.catalog.default_limit > self.catalog.max_limit {
            return Err(ConfigError::InvalidValue(
                "catalog.default_limit must be between 1 and catalog.max_limit".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.pages.cart_path, "/cart");
        assert_eq!(config.catalog.default_limit, 50);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\n\n[pages]\ncart_path = \"/basket\"\n"
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.pages.cart_path, "/basket");
        assert_eq!(config.pages.confirmation_path, "/order-confirmation");
        assert_eq!(config.bind_address(), "127.0.0.1:9090");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[pages]\ncart_path = \"cart\"\n").unwrap();
        assert!(matches!(
            AppConfig::load_from(file.path()),
            Err(ConfigError::InvalidValue(_))
        ));

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nport = \"not-a-port\"\n").unwrap();
        assert!(matches!(
            AppConfig::load_from(file.path()),
            Err(ConfigError::Load(_))
        ));
    }
}
