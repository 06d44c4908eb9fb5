//! Visit persistence and aggregation
//!
//! Visits are append-only; nothing updates or deletes them. The aggregate
//! queries group in SQL, with the calendar-day bucket expressed per backend
//! since the date-formatting function differs between SQLite, MySQL and
//! PostgreSQL.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};

use migration::entities::visit;

use super::SeaOrmStore;
use super::models::DeviceClass;
use super::retry;
use crate::errors::Result;

/// Clicks for one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DailyClicks {
    pub day: String,
    pub clicks: u64,
}

/// Clicks for one device class.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeviceClicks {
    pub device: DeviceClass,
    pub clicks: u64,
}

#[derive(Debug, FromQueryResult)]
struct DailyRow {
    day: String,
    clicks: i64,
}

#[derive(Debug, FromQueryResult)]
struct DeviceRow {
    device: String,
    clicks: i64,
}

impl SeaOrmStore {
    /// Append one visit row. Immutable once written.
    pub async fn insert_visit(
        &self,
        link_id: &str,
        address: Option<String>,
        device: DeviceClass,
        visited_at: DateTime<Utc>,
    ) -> Result<()> {
        let db = self.db();
        let active = visit::ActiveModel {
            link_id: Set(link_id.to_string()),
            address: Set(address),
            device: Set(device.as_ref().to_string()),
            visited_at: Set(visited_at),
            ..Default::default()
        };

        retry::with_retry("insert_visit", self.retry_config(), || async {
            visit::Entity::insert(active.clone()).exec(db).await
        })
        .await?;

        Ok(())
    }

    /// Total visit rows for a link.
    pub async fn count_visits(&self, link_id: &str) -> Result<u64> {
        let count = visit::Entity::find()
            .filter(visit::Column::LinkId.eq(link_id))
            .count(self.db())
            .await?;
        Ok(count)
    }

    /// Count of distinct non-null addresses among a link's visits.
    /// Address-less visits do not contribute a distinct value.
    pub async fn count_distinct_addresses(&self, link_id: &str) -> Result<u64> {
        let addresses: Vec<Option<String>> = visit::Entity::find()
            .select_only()
            .column(visit::Column::Address)
            .filter(visit::Column::LinkId.eq(link_id))
            .filter(visit::Column::Address.is_not_null())
            .distinct()
            .into_tuple()
            .all(self.db())
            .await?;

        Ok(addresses.into_iter().flatten().count() as u64)
    }

    /// Calendar-day expression for the current backend.
    fn daily_bucket_expr(&self) -> Expr {
        match self.backend_name() {
            "mysql" => Expr::cust("DATE_FORMAT(visited_at, '%Y-%m-%d')"),
            "postgres" => Expr::cust("to_char(visited_at, 'YYYY-MM-DD')"),
            _ => Expr::cust("strftime('%Y-%m-%d', visited_at)"),
        }
    }

    /// Visits per UTC calendar day, ascending.
    pub async fn daily_clicks(&self, link_id: &str) -> Result<Vec<DailyClicks>> {
        let date_expr = self.daily_bucket_expr();

        let rows = visit::Entity::find()
            .select_only()
            .column_as(date_expr.clone(), "day")
            .column_as(visit::Column::Id.count(), "clicks")
            .filter(visit::Column::LinkId.eq(link_id))
            .group_by(date_expr)
            .order_by_asc(Expr::cust("day"))
            .into_model::<DailyRow>()
            .all(self.db())
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| DailyClicks {
                day: r.day,
                clicks: r.clicks.max(0) as u64,
            })
            .collect())
    }

    /// Visits per device class.
    pub async fn device_clicks(&self, link_id: &str) -> Result<Vec<DeviceClicks>> {
        let rows = visit::Entity::find()
            .select_only()
            .column(visit::Column::Device)
            .column_as(visit::Column::Id.count(), "clicks")
            .filter(visit::Column::LinkId.eq(link_id))
            .group_by(visit::Column::Device)
            .into_model::<DeviceRow>()
            .all(self.db())
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| DeviceClicks {
                device: r.device.parse().unwrap_or(DeviceClass::Desktop),
                clicks: r.clicks.max(0) as u64,
            })
            .collect())
    }
}
