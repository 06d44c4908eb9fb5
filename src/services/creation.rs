//! Link creation
//!
//! Two entry modes: anonymous (random alias, no owner, no QR) and owned
//! (optional custom slug, QR code, activation time). The slug existence
//! check is a fast-path hint only; the unique index on the alias column is
//! the authoritative arbiter and its rejection surfaces as `Conflict`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::UrlConfig;
use crate::errors::{Result, ServiceError};
use crate::storage::{Link, SeaOrmStore};
use crate::utils::qr;
use crate::utils::url_validator::validate_url;
use crate::utils::{generate_alias, is_valid_alias};

/// Result of a creation call.
#[derive(Debug, Clone)]
pub struct CreatedLink {
    pub alias: String,
    pub short_link: String,
    pub qr_code: Option<String>,
}

/// Owned-mode creation input.
#[derive(Debug, Clone)]
pub struct OwnedCreateRequest {
    pub target: String,
    /// Requested custom slug; a random alias is generated when absent.
    pub slug: Option<String>,
    pub owner_id: String,
    /// Link is inert before this instant; defaults to creation time.
    pub active_from: Option<DateTime<Utc>>,
}

pub struct LinkCreationService {
    store: Arc<SeaOrmStore>,
    urls: UrlConfig,
    alias_length: usize,
}

impl LinkCreationService {
    pub fn new(store: Arc<SeaOrmStore>, urls: UrlConfig, alias_length: usize) -> Self {
        Self {
            store,
            urls,
            alias_length,
        }
    }

    fn blank_link(target: &str, alias: String, now: DateTime<Utc>) -> Link {
        Link {
            id: uuid::Uuid::new_v4().to_string(),
            alias,
            target: target.to_string(),
            click_count: 0,
            owner_id: None,
            qr_code: None,
            qr_generated: false,
            expires_at: None,
            active_from: now,
            is_expired: false,
            password_hash: None,
            is_password_protected: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Guest shortening: random alias, no owner, no QR.
    ///
    /// No explicit collision check; the astronomically unlikely duplicate
    /// alias is rejected by the unique index and surfaces as `Conflict`.
    pub async fn create_anonymous(&self, target: &str) -> Result<CreatedLink> {
        validate_url(target).map_err(|e| ServiceError::bad_request(e.to_string()))?;

        let alias = generate_alias(self.alias_length);
        let link = Self::blank_link(target, alias.clone(), Utc::now());

        self.store.insert_link(&link).await?;

        info!("Anonymous link created: {}", alias);
        Ok(CreatedLink {
            short_link: self.urls.short_link(&alias),
            alias,
            qr_code: None,
        })
    }

    /// Owned shortening: custom slug support, QR code, activation time.
    pub async fn create_owned(&self, req: OwnedCreateRequest) -> Result<CreatedLink> {
        validate_url(&req.target).map_err(|e| ServiceError::bad_request(e.to_string()))?;

        let (alias, generated) = match req.slug.filter(|s| !s.is_empty()) {
            Some(slug) => {
                if !is_valid_alias(&slug) {
                    return Err(ServiceError::bad_request(format!(
                        "Invalid slug '{}'. Only alphanumeric, underscore and hyphen are allowed",
                        slug
                    )));
                }
                (slug, false)
            }
            None => (generate_alias(self.alias_length), true),
        };

        // Fast-path hint; concurrent creations with the same slug can both
        // pass this and the insert below decides the race.
        if !generated && self.store.alias_exists(&alias).await? {
            return Err(ServiceError::conflict("Custom slug already exists"));
        }

        let short_link = self.urls.short_link(&alias);
        let qr_code = qr::render_data_uri(&short_link)?;

        let now = Utc::now();
        let mut link = Self::blank_link(&req.target, alias.clone(), now);
        link.owner_id = Some(req.owner_id);
        link.qr_code = Some(qr_code.clone());
        link.qr_generated = true;
        if let Some(active_from) = req.active_from {
            link.active_from = active_from;
        }

        self.store.insert_link(&link).await?;

        info!(
            "Owned link created: {} ({} slug)",
            alias,
            if generated { "generated" } else { "custom" }
        );
        Ok(CreatedLink {
            alias,
            short_link,
            qr_code: Some(qr_code),
        })
    }
}
