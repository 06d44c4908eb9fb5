//! Link resolution
//!
//! The state machine over one alias lookup, evaluated in fixed order: not
//! found, expired, not yet active, password challenge, success. Each step is
//! terminal. Expiry is checked before activation, both before password, so
//! an expired-but-never-activated link reports `Expired`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::clicks::ClickRecorder;
use crate::config::UrlConfig;
use crate::errors::{Result, ServiceError};
use crate::storage::SeaOrmStore;
use crate::utils::device::classify_device;
use crate::utils::password::verify_password;

/// Request-scoped facts about the visitor, passed in explicitly.
#[derive(Debug, Clone, Default)]
pub struct VisitorInfo {
    pub address: Option<String>,
    pub user_agent: Option<String>,
}

/// Terminal outcome of a resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Alias unknown.
    Gone,
    Expired {
        expired_at: DateTime<Utc>,
        alias: String,
    },
    NotActive {
        active_from: DateTime<Utc>,
        short_link: String,
    },
    PasswordRequired {
        alias: String,
    },
    Redirect {
        target: String,
    },
}

pub struct ResolutionService {
    store: Arc<SeaOrmStore>,
    recorder: ClickRecorder,
    urls: UrlConfig,
}

impl ResolutionService {
    pub fn new(store: Arc<SeaOrmStore>, urls: UrlConfig) -> Self {
        let recorder = ClickRecorder::new(Arc::clone(&store));
        Self {
            store,
            recorder,
            urls,
        }
    }

    /// Resolve an alias to its terminal outcome, recording the visit on
    /// success.
    pub async fn resolve(&self, alias: &str, visitor: &VisitorInfo) -> Result<Outcome> {
        let now = Utc::now();

        let Some(link) = self.store.find_link_by_alias(alias).await? else {
            debug!("Resolution miss: {}", alias);
            return Ok(Outcome::Gone);
        };

        if let Some(expired_at) = link.expires_at.filter(|exp| now > *exp) {
            // Lazy write-back of the cached flag. Best-effort and
            // idempotent; a persistence failure must not turn the read
            // into an error.
            if !link.is_expired
                && let Err(e) = self.store.mark_expired(&link.id).await
            {
                warn!("Failed to persist expired flag for '{}': {}", link.alias, e);
            }
            return Ok(Outcome::Expired {
                expired_at,
                alias: link.alias,
            });
        }

        if link.is_before_activation(now) {
            return Ok(Outcome::NotActive {
                active_from: link.active_from,
                short_link: self.urls.short_link(&link.alias),
            });
        }

        if link.is_password_protected {
            return Ok(Outcome::PasswordRequired { alias: link.alias });
        }

        let device = classify_device(visitor.user_agent.as_deref());
        self.recorder
            .record(&link.id, visitor.address.clone(), device)
            .await?;

        Ok(Outcome::Redirect {
            target: link.target,
        })
    }

    /// Unlock a password-protected link.
    ///
    /// `NotFound` for an unknown or unprotected alias, `Unauthorized` on a
    /// mismatch; both are routine outcomes. A successful unlock counts as
    /// a visit like any other resolution.
    pub async fn verify_link_password(
        &self,
        alias: &str,
        candidate: &str,
        visitor: &VisitorInfo,
    ) -> Result<String> {
        let Some(link) = self.store.find_link_by_alias(alias).await? else {
            return Err(ServiceError::not_found("Link not found or not protected"));
        };

        let Some(hash) = link.password_hash.as_deref() else {
            return Err(ServiceError::not_found("Link not found or not protected"));
        };

        let matches = verify_password(candidate, hash)
            .map_err(|e| ServiceError::password_hash(e.to_string()))?;
        if !matches {
            return Err(ServiceError::unauthorized("Incorrect password"));
        }

        let device = classify_device(visitor.user_agent.as_deref());
        self.recorder
            .record(&link.id, visitor.address.clone(), device)
            .await?;

        Ok(link.target)
    }
}
