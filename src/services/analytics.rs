//! Click analytics
//!
//! Read-only aggregation over a link's visit stream. Owner-gated at the
//! call site through an explicit account id, never through ambient state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ServiceError};
use crate::storage::{DailyClicks, DeviceClicks, Link, SeaOrmStore};

/// Aggregate click summary for one link.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    pub total_clicks: u64,
    pub unique_clicks: u64,
    pub daily_clicks: Vec<DailyClicks>,
    pub device_breakdown: Vec<DeviceClicks>,
}

pub struct AnalyticsService {
    store: Arc<SeaOrmStore>,
}

impl AnalyticsService {
    pub fn new(store: Arc<SeaOrmStore>) -> Self {
        Self { store }
    }

    /// Compute the summary for a link id. Zero visits is a valid answer
    /// with empty breakdowns, not an error.
    pub async fn summarize(&self, link_id: &str) -> Result<LinkSummary> {
        let total_clicks = self.store.count_visits(link_id).await?;
        let unique_clicks = self.store.count_distinct_addresses(link_id).await?;
        let daily_clicks = self.store.daily_clicks(link_id).await?;
        let device_breakdown = self.store.device_clicks(link_id).await?;

        Ok(LinkSummary {
            total_clicks,
            unique_clicks,
            daily_clicks,
            device_breakdown,
        })
    }

    /// Fetch a link by alias and summarize it for its owner.
    ///
    /// `NotFound` for unknown aliases; `Forbidden` when the requester does
    /// not own the link (anonymous links have no owner and are never
    /// viewable here).
    pub async fn summarize_for_owner(
        &self,
        alias: &str,
        account_id: &str,
    ) -> Result<(Link, LinkSummary)> {
        let link = self
            .store
            .find_link_by_alias(alias)
            .await?
            .ok_or_else(|| ServiceError::not_found("Link not found"))?;

        if !link.is_owned_by(account_id) {
            return Err(ServiceError::forbidden(
                "You do not have permission to view analytics for this link",
            ));
        }

        let summary = self.summarize(&link.id).await?;
        Ok((link, summary))
    }
}
