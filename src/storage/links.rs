//! Link persistence
//!
//! All write paths for the `links` table. The unique index on `alias` is the
//! authoritative arbiter for collisions: an insert racing a concurrent
//! creation loses with a `Conflict`, never with silent overwrite. The click
//! counter only ever moves through [`SeaOrmStore::increment_clicks`], which
//! issues a relative `click_count + 1` update, never a read-modify-write.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ColumnTrait, EntityTrait, ExprTrait, PaginatorTrait, QueryFilter, QueryOrder, sea_query::Expr,
};
use tracing::{debug, info};

use migration::entities::link;

use super::SeaOrmStore;
use super::models::Link;
use super::retry;
use crate::errors::{Result, ServiceError};

/// Field changes for an owner-initiated settings update.
///
/// Outer `None` leaves a field untouched. `password`: `Some(Some(hash))`
/// enables protection with a fresh hash, `Some(None)` disables it.
#[derive(Debug, Clone, Default)]
pub struct LinkSettingsPatch {
    pub expires_at: Option<Option<chrono::DateTime<Utc>>>,
    pub is_expired: Option<bool>,
    pub password: Option<Option<String>>,
}

impl LinkSettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.expires_at.is_none() && self.is_expired.is_none() && self.password.is_none()
    }
}

impl SeaOrmStore {
    /// Persist a new link. A duplicate alias surfaces as `Conflict`.
    pub async fn insert_link(&self, new_link: &Link) -> Result<()> {
        let db = self.db();
        let active = link::ActiveModel {
            id: Set(new_link.id.clone()),
            alias: Set(new_link.alias.clone()),
            target_url: Set(new_link.target.clone()),
            click_count: Set(new_link.click_count as i64),
            owner_id: Set(new_link.owner_id.clone()),
            qr_code: Set(new_link.qr_code.clone()),
            qr_generated: Set(new_link.qr_generated),
            expires_at: Set(new_link.expires_at),
            active_from: Set(new_link.active_from),
            is_expired: Set(new_link.is_expired),
            password_hash: Set(new_link.password_hash.clone()),
            is_password_protected: Set(new_link.is_password_protected),
            created_at: Set(new_link.created_at),
            updated_at: Set(new_link.updated_at),
        };

        retry::with_retry(
            &format!("insert_link({})", new_link.alias),
            self.retry_config(),
            || async { link::Entity::insert(active.clone()).exec(db).await },
        )
        .await?;

        info!("Link created: {} -> {}", new_link.alias, new_link.target);
        Ok(())
    }

    pub async fn find_link_by_alias(&self, alias: &str) -> Result<Option<Link>> {
        let model = link::Entity::find()
            .filter(link::Column::Alias.eq(alias))
            .one(self.db())
            .await?;
        Ok(model.map(Link::from))
    }

    /// Fast-path existence probe for custom slugs. A hint only; the unique
    /// index decides the race.
    pub async fn alias_exists(&self, alias: &str) -> Result<bool> {
        let count = link::Entity::find()
            .filter(link::Column::Alias.eq(alias))
            .count(self.db())
            .await?;
        Ok(count > 0)
    }

    /// All links belonging to an account, newest first.
    pub async fn list_links_by_owner(&self, owner_id: &str) -> Result<Vec<Link>> {
        let models = link::Entity::find()
            .filter(link::Column::OwnerId.eq(owner_id))
            .order_by_desc(link::Column::CreatedAt)
            .all(self.db())
            .await?;
        Ok(models.into_iter().map(Link::from).collect())
    }

    /// Fetch a link through the compound `(owner_id, id)` filter.
    pub async fn find_owned_link(&self, owner_id: &str, link_id: &str) -> Result<Option<Link>> {
        let model = link::Entity::find()
            .filter(link::Column::Id.eq(link_id))
            .filter(link::Column::OwnerId.eq(owner_id))
            .one(self.db())
            .await?;
        Ok(model.map(Link::from))
    }

    /// Apply an owner-initiated settings update.
    ///
    /// The compound `(owner_id, id)` filter makes cross-owner mutation
    /// impossible at the store layer; zero rows affected reads as not found.
    pub async fn update_owned_settings(
        &self,
        owner_id: &str,
        link_id: &str,
        patch: LinkSettingsPatch,
    ) -> Result<Link> {
        let mut update = link::Entity::update_many()
            .filter(link::Column::Id.eq(link_id))
            .filter(link::Column::OwnerId.eq(owner_id))
            .col_expr(link::Column::UpdatedAt, Expr::value(Utc::now()));

        if let Some(expires_at) = patch.expires_at {
            update = update.col_expr(link::Column::ExpiresAt, Expr::value(expires_at));
            // A fresh expiry invalidates the cached flag.
            if patch.is_expired.is_none() {
                update = update.col_expr(link::Column::IsExpired, Expr::value(false));
            }
        }

        if let Some(is_expired) = patch.is_expired {
            update = update.col_expr(link::Column::IsExpired, Expr::value(is_expired));
        }

        match patch.password {
            Some(Some(hash)) => {
                update = update
                    .col_expr(link::Column::PasswordHash, Expr::value(Some(hash)))
                    .col_expr(link::Column::IsPasswordProtected, Expr::value(true));
            }
            Some(None) => {
                update = update
                    .col_expr(link::Column::PasswordHash, Expr::value(Option::<String>::None))
                    .col_expr(link::Column::IsPasswordProtected, Expr::value(false));
            }
            None => {}
        }

        let result = update.exec(self.db()).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("URL not found or not authorized"));
        }

        self.find_owned_link(owner_id, link_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("URL not found or not authorized"))
    }

    /// Delete an owned link, returning the removed record.
    pub async fn delete_owned_link(&self, owner_id: &str, link_id: &str) -> Result<Link> {
        let existing = self
            .find_owned_link(owner_id, link_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("URL not found or not authorized"))?;

        let result = link::Entity::delete_many()
            .filter(link::Column::Id.eq(link_id))
            .filter(link::Column::OwnerId.eq(owner_id))
            .exec(self.db())
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("URL not found or not authorized"));
        }

        info!("Link deleted: {}", existing.alias);
        Ok(existing)
    }

    /// Atomically bump the click counter by one.
    ///
    /// Relative update so concurrent visits cannot lose increments.
    pub async fn increment_clicks(&self, link_id: &str) -> Result<()> {
        let db = self.db();
        let result = retry::with_retry(
            &format!("increment_clicks({})", link_id),
            self.retry_config(),
            || async {
                link::Entity::update_many()
                    .col_expr(
                        link::Column::ClickCount,
                        Expr::col(link::Column::ClickCount).add(1),
                    )
                    .filter(link::Column::Id.eq(link_id))
                    .exec(db)
                    .await
            },
        )
        .await?;

        if result.rows_affected == 0 {
            debug!("increment_clicks: link {} vanished before update", link_id);
        }
        Ok(())
    }

    /// Set the cached expired flag. Idempotent; already-flagged rows are a
    /// no-op.
    pub async fn mark_expired(&self, link_id: &str) -> Result<()> {
        link::Entity::update_many()
            .col_expr(link::Column::IsExpired, Expr::value(true))
            .col_expr(link::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(link::Column::Id.eq(link_id))
            .filter(link::Column::IsExpired.eq(false))
            .exec(self.db())
            .await?;
        Ok(())
    }
}
