//! Auth cookie construction

use actix_web::cookie::{Cookie, SameSite};

use crate::config::ApiConfig;

pub const AUTH_COOKIE_NAME: &str = "curtail_token";

/// Builds the session cookie from configuration loaded at startup.
#[derive(Clone)]
pub struct CookieBuilder {
    secure: bool,
    domain: Option<String>,
    token_hours: u64,
}

impl CookieBuilder {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            secure: config.cookie_secure,
            domain: config.cookie_domain.clone(),
            token_hours: config.token_hours,
        }
    }

    fn build(&self, value: String, max_age: actix_web::cookie::time::Duration) -> Cookie<'static> {
        let mut cookie = Cookie::new(AUTH_COOKIE_NAME.to_string(), value);
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(self.secure);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_max_age(max_age);
        if let Some(ref domain) = self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }

    pub fn build_auth_cookie(&self, token: String) -> Cookie<'static> {
        self.build(
            token,
            actix_web::cookie::time::Duration::hours(self.token_hours as i64),
        )
    }

    /// Immediately-expiring cookie used by logout.
    pub fn build_expired_auth_cookie(&self) -> Cookie<'static> {
        self.build(String::new(), actix_web::cookie::time::Duration::ZERO)
    }
}
