//! JWT issuance and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::ApiConfig;

/// Session token claims; `sub` is the account id.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_hours: u64,
}

impl JwtService {
    pub fn new(secret: &str, token_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_hours,
        }
    }

    /// Build from configuration. An empty secret gets a random replacement,
    /// which invalidates all sessions on restart.
    pub fn from_config(config: &ApiConfig) -> Self {
        let secret = if config.jwt_secret.is_empty() {
            warn!("JWT secret not configured, generating a random one for this process");
            crate::utils::generate_alias(48)
        } else {
            config.jwt_secret.clone()
        };

        Self::new(&secret, config.token_hours)
    }

    pub fn token_hours(&self) -> u64 {
        self.token_hours
    }

    pub fn generate_token(
        &self,
        account_id: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_hours as i64)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test_secret_key_32_bytes_long!!", 6)
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = create_test_service();
        let token = service.generate_token("acct-42").unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "acct-42");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();
        assert!(service.validate_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service1 = create_test_service();
        let service2 = JwtService::new("different_secret_key_32_bytes!!", 6);

        let token = service1.generate_token("acct-42").unwrap();
        assert!(service2.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = create_test_service();

        let now = Utc::now();
        let claims = Claims {
            sub: "acct-42".to_string(),
            iat: (now - Duration::hours(8)).timestamp(),
            exp: (now - Duration::hours(2)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let encoding_key = EncodingKey::from_secret(b"test_secret_key_32_bytes_long!!");
        let token = encode(&Header::default(), &claims, &encoding_key).unwrap();

        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_from_config_with_empty_secret_still_works() {
        let service = JwtService::from_config(&ApiConfig::default());
        let token = service.generate_token("acct-1").unwrap();
        assert_eq!(service.validate_token(&token).unwrap().sub, "acct-1");
    }
}
