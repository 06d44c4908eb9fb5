//! Account persistence

use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::info;

use migration::entities::account;

use super::SeaOrmStore;
use super::models::Account;
use super::retry;
use crate::errors::Result;

impl SeaOrmStore {
    /// Persist a new account. A duplicate email surfaces as `Conflict`.
    pub async fn insert_account(&self, new_account: &Account) -> Result<()> {
        let db = self.db();
        let active = account::ActiveModel {
            id: Set(new_account.id.clone()),
            name: Set(new_account.name.clone()),
            email: Set(new_account.email.clone()),
            password_hash: Set(new_account.password_hash.clone()),
            external_id: Set(new_account.external_id.clone()),
            avatar: Set(new_account.avatar.clone()),
            provider: Set(new_account.provider.as_ref().to_string()),
            created_at: Set(new_account.created_at),
            updated_at: Set(new_account.updated_at),
        };

        retry::with_retry(
            &format!("insert_account({})", new_account.email),
            self.retry_config(),
            || async { account::Entity::insert(active.clone()).exec(db).await },
        )
        .await?;

        info!("Account created: {}", new_account.email);
        Ok(())
    }

    pub async fn find_account_by_id(&self, id: &str) -> Result<Option<Account>> {
        let model = account::Entity::find_by_id(id).one(self.db()).await?;
        Ok(model.map(Account::from))
    }

    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let model = account::Entity::find()
            .filter(account::Column::Email.eq(email))
            .one(self.db())
            .await?;
        Ok(model.map(Account::from))
    }

    pub async fn find_account_by_external_id(&self, external_id: &str) -> Result<Option<Account>> {
        let model = account::Entity::find()
            .filter(account::Column::ExternalId.eq(external_id))
            .one(self.db())
            .await?;
        Ok(model.map(Account::from))
    }

    /// Attach an external identity to an existing account.
    pub async fn attach_external_identity(
        &self,
        account_id: &str,
        external_id: &str,
        avatar: Option<String>,
    ) -> Result<()> {
        use sea_orm::sea_query::Expr;

        account::Entity::update_many()
            .col_expr(account::Column::ExternalId, Expr::value(Some(external_id)))
            .col_expr(account::Column::Avatar, Expr::value(avatar))
            .col_expr(account::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(account::Column::Id.eq(account_id))
            .exec(self.db())
            .await?;
        Ok(())
    }
}
