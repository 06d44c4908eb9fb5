//! Link management endpoints
//!
//! Creation (anonymous and owned) plus the owner-scoped list / settings
//! update / delete surface. Every owner mutation goes through the store's
//! compound `(owner_id, link_id)` filter, so cross-owner access dies at the
//! store layer, not just here.

use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::api::identity::{Identity, MaybeIdentity};
use crate::api::responses::{created_response, error_response, success_response};
use crate::config::UrlConfig;
use crate::errors::{FieldError, ServiceError};
use crate::services::{LinkCreationService, OwnedCreateRequest};
use crate::storage::{Link, LinkSettingsPatch, SeaOrmStore};
use crate::utils::password::hash_password;

/// Distinguishes an absent field from an explicit `null`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    pub url: String,
    pub slug: Option<String>,
    pub active_from: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkResponse {
    pub short_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLinkSettingsRequest {
    /// Absent = keep; `null` = never expires; timestamp = new expiry.
    #[serde(default, deserialize_with = "double_option")]
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub is_expired: Option<bool>,
    pub is_link_password: Option<bool>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: String,
    pub alias: String,
    pub short_url: String,
    pub target: String,
    pub clicks: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
    pub is_password_protected: bool,
    pub is_expired: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub active_from: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkResponse {
    pub fn from_link(link: Link, urls: &UrlConfig) -> Self {
        Self {
            short_url: urls.short_link(&link.alias),
            id: link.id,
            alias: link.alias,
            target: link.target,
            clicks: link.click_count,
            qr_code: link.qr_code,
            is_password_protected: link.is_password_protected,
            is_expired: link.is_expired,
            expires_at: link.expires_at,
            active_from: link.active_from,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct UrlListEnvelope {
    urls: Vec<LinkResponse>,
}

/// Create a short link. Anonymous callers get a random alias; an
/// authenticated caller may request a custom slug and gets a QR code.
pub async fn create_link(
    identity: MaybeIdentity,
    payload: web::Json<CreateLinkRequest>,
    creation: web::Data<LinkCreationService>,
) -> impl Responder {
    let req = payload.into_inner();

    match identity.0 {
        Some(identity) => {
            let result = creation
                .create_owned(OwnedCreateRequest {
                    target: req.url,
                    slug: req.slug,
                    owner_id: identity.account.id,
                    active_from: req.active_from,
                })
                .await;
            match result {
                Ok(created) => created_response(
                    "Short URL created successfully",
                    CreateLinkResponse {
                        short_url: created.short_link,
                        qr_code: created.qr_code,
                    },
                ),
                Err(e) => error_response(&e),
            }
        }
        None => match creation.create_anonymous(&req.url).await {
            Ok(created) => created_response(
                "Short URL created successfully",
                CreateLinkResponse {
                    short_url: created.short_link,
                    qr_code: None,
                },
            ),
            Err(e) => error_response(&e),
        },
    }
}

/// List the requester's links, newest first.
pub async fn list_links(
    identity: Identity,
    store: web::Data<Arc<SeaOrmStore>>,
    urls: web::Data<UrlConfig>,
) -> impl Responder {
    match store.list_links_by_owner(&identity.account.id).await {
        Ok(links) => success_response(
            "URLs fetched successfully",
            UrlListEnvelope {
                urls: links
                    .into_iter()
                    .map(|l| LinkResponse::from_link(l, &urls))
                    .collect(),
            },
        ),
        Err(e) => error_response(&e),
    }
}

fn validate_settings(req: &UpdateLinkSettingsRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if req.is_link_password == Some(true) {
        match req.password.as_deref() {
            None | Some("") => errors.push(FieldError::new(
                "password",
                "Password is required when enabling link protection",
            )),
            Some(pwd) if pwd.len() < 8 => errors.push(FieldError::new(
                "password",
                "Link password must be at least 8 characters long",
            )),
            _ => {}
        }
    }

    errors
}

fn build_patch(req: UpdateLinkSettingsRequest) -> Result<LinkSettingsPatch, ServiceError> {
    let password = match req.is_link_password {
        Some(true) => {
            // Presence is guaranteed by validation.
            let plaintext = req.password.as_deref().unwrap_or_default();
            let hash = hash_password(plaintext)
                .map_err(|e| ServiceError::password_hash(e.to_string()))?;
            Some(Some(hash))
        }
        Some(false) => Some(None),
        None => None,
    };

    Ok(LinkSettingsPatch {
        expires_at: req.expires_at,
        is_expired: req.is_expired,
        password,
    })
}

/// Update expiry / password / expired-flag settings on an owned link.
pub async fn update_link(
    identity: Identity,
    link_id: web::Path<String>,
    payload: web::Json<UpdateLinkSettingsRequest>,
    store: web::Data<Arc<SeaOrmStore>>,
    urls: web::Data<UrlConfig>,
) -> impl Responder {
    let req = payload.into_inner();

    let field_errors = validate_settings(&req);
    if !field_errors.is_empty() {
        return error_response(&ServiceError::validation(field_errors));
    }

    let patch = match build_patch(req) {
        Ok(patch) => patch,
        Err(e) => return error_response(&e),
    };

    if patch.is_empty() {
        return error_response(&ServiceError::bad_request("No settings to update"));
    }

    match store
        .update_owned_settings(&identity.account.id, &link_id, patch)
        .await
    {
        Ok(link) => {
            info!("Link settings updated: {}", link.alias);
            success_response(
                "URL updated successfully",
                LinkResponse::from_link(link, &urls),
            )
        }
        Err(e) => error_response(&e),
    }
}

/// Delete an owned link.
pub async fn delete_link(
    identity: Identity,
    link_id: web::Path<String>,
    store: web::Data<Arc<SeaOrmStore>>,
    urls: web::Data<UrlConfig>,
) -> HttpResponse {
    match store
        .delete_owned_link(&identity.account.id, &link_id)
        .await
    {
        Ok(link) => success_response(
            "URL deleted successfully",
            LinkResponse::from_link(link, &urls),
        ),
        Err(e) => error_response(&e),
    }
}
