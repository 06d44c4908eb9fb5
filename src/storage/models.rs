//! Domain models
//!
//! Plain structs handed across the service layer, converted from the
//! sea-orm entity models owned by the `migration` crate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use migration::entities::{account, link, visit};

/// Coarse device classification of a visit's origin.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

/// Identity provider tag for an account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Provider {
    Local,
    Google,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub alias: String,
    pub target: String,
    pub click_count: u64,
    pub owner_id: Option<String>,
    pub qr_code: Option<String>,
    pub qr_generated: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub active_from: DateTime<Utc>,
    /// Cached derived fact; the authoritative check is `expires_at` vs now.
    pub is_expired: bool,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub is_password_protected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now > exp)
    }

    pub fn is_before_activation(&self, now: DateTime<Utc>) -> bool {
        now < self.active_from
    }

    pub fn is_owned_by(&self, account_id: &str) -> bool {
        self.owner_id.as_deref() == Some(account_id)
    }
}

impl From<link::Model> for Link {
    fn from(m: link::Model) -> Self {
        Self {
            id: m.id,
            alias: m.alias,
            target: m.target_url,
            click_count: m.click_count.max(0) as u64,
            owner_id: m.owner_id,
            qr_code: m.qr_code,
            qr_generated: m.qr_generated,
            expires_at: m.expires_at,
            active_from: m.active_from,
            is_expired: m.is_expired,
            password_hash: m.password_hash,
            is_password_protected: m.is_password_protected,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub id: i64,
    pub link_id: String,
    pub address: Option<String>,
    pub device: DeviceClass,
    pub visited_at: DateTime<Utc>,
}

impl From<visit::Model> for Visit {
    fn from(m: visit::Model) -> Self {
        Self {
            id: m.id,
            link_id: m.link_id,
            // Unknown stored values fall back to desktop, same as
            // classification of an unknown user agent.
            device: m.device.parse().unwrap_or(DeviceClass::Desktop),
            address: m.address,
            visited_at: m.visited_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub external_id: Option<String>,
    pub avatar: Option<String>,
    pub provider: Provider,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<account::Model> for Account {
    fn from(m: account::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            password_hash: m.password_hash,
            external_id: m.external_id,
            avatar: m.avatar,
            provider: m.provider.parse().unwrap_or(Provider::Local),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_link(expires_at: Option<DateTime<Utc>>, active_from: DateTime<Utc>) -> Link {
        Link {
            id: "id-1".to_string(),
            alias: "abc123d".to_string(),
            target: "https://example.com".to_string(),
            click_count: 0,
            owner_id: None,
            qr_code: None,
            qr_generated: false,
            expires_at,
            active_from,
            is_expired: false,
            password_hash: None,
            is_password_protected: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_expiry_window_checks() {
        let now = Utc::now();

        let no_expiry = sample_link(None, now - Duration::hours(1));
        assert!(!no_expiry.is_past_expiry(now));
        assert!(!no_expiry.is_before_activation(now));

        let expired = sample_link(Some(now - Duration::minutes(5)), now - Duration::hours(1));
        assert!(expired.is_past_expiry(now));

        let pending = sample_link(None, now + Duration::hours(1));
        assert!(pending.is_before_activation(now));
    }

    #[test]
    fn test_device_class_round_trip() {
        assert_eq!("mobile".parse::<DeviceClass>().unwrap(), DeviceClass::Mobile);
        assert_eq!(DeviceClass::Desktop.as_ref(), "desktop");
        assert_eq!("weird".parse::<DeviceClass>().ok(), None);
    }

    #[test]
    fn test_ownership_check() {
        let mut link = sample_link(None, Utc::now());
        assert!(!link.is_owned_by("acct-1"));
        link.owner_id = Some("acct-1".to_string());
        assert!(link.is_owned_by("acct-1"));
        assert!(!link.is_owned_by("acct-2"));
    }
}
