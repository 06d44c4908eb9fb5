//! Document store facade
//!
//! [`SeaOrmStore`] wraps a sea-orm connection over SQLite, MySQL or
//! PostgreSQL. The schema lives in the `migration` workspace member. The two
//! primitives the rest of the system leans on for cross-request consistency
//! are provided here: the unique index on `links.alias` and the atomic
//! click-count increment.

mod accounts;
mod connection;
mod links;
pub mod models;
pub mod retry;
mod visits;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, ServiceError};

pub use links::LinkSettingsPatch;
pub use models::{Account, DeviceClass, Link, Provider, Visit};
pub use visits::{DailyClicks, DeviceClicks};

/// Infer the database backend from the URL scheme.
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(ServiceError::database_config(format!(
            "Cannot infer database backend from URL: {}. Supported schemes: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStore {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let database_url = &config.database_url;
        if database_url.is_empty() {
            return Err(ServiceError::database_config("database_url is not set"));
        }

        let backend_name = infer_backend_from_url(database_url)?;

        let retry_config = retry::RetryConfig {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
        };

        let db = if backend_name == "sqlite" {
            connection::connect_sqlite(database_url).await?
        } else {
            connection::connect_generic(database_url, &backend_name, config.pool_size).await?
        };

        let store = SeaOrmStore {
            db,
            backend_name,
            retry_config,
        };

        connection::run_migrations(&store.db).await?;

        info!("{} storage initialized", store.backend_name.to_uppercase());
        Ok(store)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    pub(crate) fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub(crate) fn retry_config(&self) -> retry::RetryConfig {
        self.retry_config
    }
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStore>> {
        Ok(Arc::new(SeaOrmStore::new(config).await?))
    }
}
