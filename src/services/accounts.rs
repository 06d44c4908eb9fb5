//! Account service (supporting layer)
//!
//! Local signup/login plus the arrival point for federated identity
//! results. Login failures are deliberately uniform: unknown email and bad
//! password both answer "Invalid credentials".

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::errors::{Result, ServiceError};
use crate::storage::{Account, Provider, SeaOrmStore};
use crate::utils::password::{hash_password, verify_password};

/// An external identity result: provider id plus profile basics. How it was
/// obtained (OAuth flow etc.) is outside this crate.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

pub struct AccountService {
    store: Arc<SeaOrmStore>,
}

impl AccountService {
    pub fn new(store: Arc<SeaOrmStore>) -> Self {
        Self { store }
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<Account> {
        if self.store.find_account_by_email(email).await?.is_some() {
            return Err(ServiceError::conflict("User already exists"));
        }

        let password_hash =
            hash_password(password).map_err(|e| ServiceError::password_hash(e.to_string()))?;

        let now = Utc::now();
        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: Some(password_hash),
            external_id: None,
            avatar: None,
            provider: Provider::Local,
            created_at: now,
            updated_at: now,
        };

        // The unique index on email backstops a concurrent signup race.
        self.store.insert_account(&account).await?;
        Ok(account)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Account> {
        let Some(account) = self.store.find_account_by_email(email).await? else {
            return Err(ServiceError::unauthorized("Invalid credentials"));
        };

        let Some(hash) = account.password_hash.as_deref() else {
            // Federated account without a local password.
            return Err(ServiceError::unauthorized("Invalid credentials"));
        };

        let matches = verify_password(password, hash)
            .map_err(|e| ServiceError::password_hash(e.to_string()))?;
        if !matches {
            return Err(ServiceError::unauthorized("Invalid credentials"));
        }

        Ok(account)
    }

    /// Upsert an account from an external identity result: matched by
    /// provider id first, then by email (attaching the identity), created
    /// otherwise.
    pub async fn external_login(&self, identity: ExternalIdentity) -> Result<Account> {
        if let Some(account) = self
            .store
            .find_account_by_external_id(&identity.external_id)
            .await?
        {
            return Ok(account);
        }

        if let Some(account) = self.store.find_account_by_email(&identity.email).await? {
            self.store
                .attach_external_identity(
                    &account.id,
                    &identity.external_id,
                    identity.avatar.clone(),
                )
                .await?;
            return self
                .store
                .find_account_by_id(&account.id)
                .await?
                .ok_or_else(|| ServiceError::internal("Account vanished during external login"));
        }

        let now = Utc::now();
        let account = Account {
            id: uuid::Uuid::new_v4().to_string(),
            name: identity
                .name
                .unwrap_or_else(|| identity.email.clone()),
            email: identity.email,
            password_hash: None,
            external_id: Some(identity.external_id),
            avatar: identity.avatar,
            provider: Provider::Google,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_account(&account).await?;
        info!("Account created from external identity: {}", account.email);
        Ok(account)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Account>> {
        self.store.find_account_by_id(id).await
    }
}
