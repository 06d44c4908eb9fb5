//! Application configuration
//!
//! Loaded once at startup from an optional `curtail.toml` plus a
//! `CURTAIL__*` environment overlay, then handed to components by value.
//! Nothing reads the process environment at call time; base URLs in
//! particular reach the creation/resolution services through [`UrlConfig`].

use serde::Deserialize;

use crate::errors::{Result, ServiceError};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub urls: UrlConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub pool_size: u32,
    pub retry_count: u32,
    pub retry_base_delay_ms: u64,
    pub retry_max_delay_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://curtail.db?mode=rwc".to_string(),
            pool_size: 10,
            retry_count: 3,
            retry_base_delay_ms: 100,
            retry_max_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// HS256 signing secret. A random one is generated when left empty,
    /// which invalidates sessions across restarts.
    pub jwt_secret: String,
    pub token_hours: u64,
    pub cookie_secure: bool,
    pub cookie_domain: Option<String>,
    /// Origins allowed by the CORS layer. Empty list = same-origin only.
    pub allowed_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_hours: 6,
            cookie_secure: false,
            cookie_domain: None,
            allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UrlConfig {
    /// Public base under which short links resolve, e.g. `https://cur.tl`.
    pub base_url: String,
    /// Frontend base for the interactive expired/not-active/protected pages.
    pub frontend_url: String,
}

impl Default for UrlConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

impl UrlConfig {
    /// Fully qualified short link for an alias.
    pub fn short_link(&self, alias: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), alias)
    }

    pub fn frontend_page(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.frontend_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Length of generated aliases.
    pub alias_length: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self { alias_length: 7 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// "text" or "json".
    pub format: String,
    /// Log file path; empty/absent logs to stdout.
    pub file: Option<String>,
    pub enable_rotation: bool,
    pub max_backups: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            file: None,
            enable_rotation: false,
            max_backups: 7,
        }
    }
}

impl AppConfig {
    /// Load configuration from `curtail.toml` (optional) and the
    /// `CURTAIL__*` environment (e.g. `CURTAIL__DATABASE__DATABASE_URL`).
    pub fn load() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("curtail").required(false))
            .add_source(
                config::Environment::with_prefix("CURTAIL")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("api.allowed_origins"),
            )
            .build()
            .map_err(|e| ServiceError::internal(format!("Failed to read configuration: {}", e)))?;

        settings
            .try_deserialize()
            .map_err(|e| ServiceError::internal(format!("Invalid configuration: {}", e)))
    }
}
