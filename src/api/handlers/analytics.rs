//! Per-link analytics endpoint, owner-only.

use actix_web::{Responder, web};
use serde::Serialize;

use crate::api::identity::Identity;
use crate::api::responses::{error_response, success_response};
use crate::config::UrlConfig;
use crate::services::{AnalyticsService, LinkSummary};
use crate::storage::Link;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LinkMeta {
    short_url: String,
    original_url: String,
    total_clicks: u64,
    is_password_protected: bool,
    expires_at: Option<chrono::DateTime<chrono::Utc>>,
    active_from: chrono::DateTime<chrono::Utc>,
    created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
struct AnalyticsEnvelope {
    link: LinkMeta,
    analytics: LinkSummary,
}

fn link_meta(link: Link, urls: &UrlConfig) -> LinkMeta {
    LinkMeta {
        short_url: urls.short_link(&link.alias),
        original_url: link.target,
        total_clicks: link.click_count,
        is_password_protected: link.is_password_protected,
        expires_at: link.expires_at,
        active_from: link.active_from,
        created_at: link.created_at,
    }
}

/// Aggregate summary for one owned link: total/unique clicks, daily series,
/// device breakdown, plus link metadata.
pub async fn link_analytics(
    identity: Identity,
    alias: web::Path<String>,
    analytics: web::Data<AnalyticsService>,
    urls: web::Data<UrlConfig>,
) -> impl Responder {
    match analytics
        .summarize_for_owner(&alias, &identity.account.id)
        .await
    {
        Ok((link, summary)) => success_response(
            "Analytics fetched successfully",
            AnalyticsEnvelope {
                link: link_meta(link, &urls),
                analytics: summary,
            },
        ),
        Err(e) => error_response(&e),
    }
}
