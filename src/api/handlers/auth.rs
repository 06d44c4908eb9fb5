//! Authentication endpoints
//!
//! Local signup/login/logout, current-user lookup, and the entry point for
//! an external identity result. Validation runs before any service call and
//! rejects with the field-level error list.

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::cookies::CookieBuilder;
use crate::api::identity::Identity;
use crate::api::jwt::JwtService;
use crate::api::responses::{created_response, error_response, json_response, success_response};
use crate::errors::{FieldError, ServiceError};
use crate::services::{AccountService, ExternalIdentity};
use crate::storage::{Account, Provider};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIdentityRequest {
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub provider: Provider,
}

impl From<Account> for UserResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            avatar: account.avatar,
            provider: account.provider,
        }
    }
}

#[derive(Debug, Serialize)]
struct UserEnvelope {
    user: UserResponse,
}

fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

fn validate_signup(req: &SignupRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if req.name.trim().len() < 2 {
        errors.push(FieldError::new("name", "Name must be at least 2 characters"));
    }
    if !looks_like_email(&req.email) {
        errors.push(FieldError::new("email", "Invalid email format"));
    }
    if req.password.len() < 8 {
        errors.push(FieldError::new(
            "password",
            "Password must be at least 8 characters long",
        ));
    }
    errors
}

fn respond_with_session(
    status_created: bool,
    message: &str,
    account: Account,
    jwt: &JwtService,
    cookies: &CookieBuilder,
) -> HttpResponse {
    let token = match jwt.generate_token(&account.id) {
        Ok(token) => token,
        Err(e) => {
            return error_response(&ServiceError::internal(format!(
                "Failed to issue session token: {}",
                e
            )));
        }
    };

    let body = UserEnvelope {
        user: UserResponse::from(account),
    };

    let mut response = if status_created {
        created_response(message, body)
    } else {
        success_response(message, body)
    };

    if let Err(e) = response.add_cookie(&cookies.build_auth_cookie(token)) {
        return error_response(&ServiceError::internal(format!(
            "Failed to attach session cookie: {}",
            e
        )));
    }
    response
}

pub async fn signup(
    payload: web::Json<SignupRequest>,
    accounts: web::Data<AccountService>,
    jwt: web::Data<JwtService>,
    cookies: web::Data<CookieBuilder>,
) -> impl Responder {
    let req = payload.into_inner();

    let field_errors = validate_signup(&req);
    if !field_errors.is_empty() {
        return error_response(&ServiceError::validation(field_errors));
    }

    match accounts
        .signup(req.name.trim(), req.email.trim(), &req.password)
        .await
    {
        Ok(account) => {
            info!("User registered: {}", account.email);
            respond_with_session(
                true,
                "User registered successfully",
                account,
                jwt.get_ref(),
                cookies.get_ref(),
            )
        }
        Err(e) => error_response(&e),
    }
}

pub async fn login(
    payload: web::Json<LoginRequest>,
    accounts: web::Data<AccountService>,
    jwt: web::Data<JwtService>,
    cookies: web::Data<CookieBuilder>,
) -> impl Responder {
    let req = payload.into_inner();

    if req.email.trim().is_empty() || req.password.is_empty() {
        return error_response(&ServiceError::validation(vec![FieldError::new(
            if req.email.trim().is_empty() {
                "email"
            } else {
                "password"
            },
            "This field is required",
        )]));
    }

    match accounts.login(req.email.trim(), &req.password).await {
        Ok(account) => respond_with_session(
            false,
            "User logged in successfully",
            account,
            jwt.get_ref(),
            cookies.get_ref(),
        ),
        Err(e) => error_response(&e),
    }
}

/// Entry point for an external identity result: a provider id plus profile
/// basics. The federation flow that produced it is not this service's
/// concern.
pub async fn external_login(
    payload: web::Json<ExternalIdentityRequest>,
    accounts: web::Data<AccountService>,
    jwt: web::Data<JwtService>,
    cookies: web::Data<CookieBuilder>,
) -> impl Responder {
    let req = payload.into_inner();

    if req.external_id.is_empty() || !looks_like_email(&req.email) {
        return error_response(&ServiceError::bad_request(
            "External identity requires a provider id and an email",
        ));
    }

    let identity = ExternalIdentity {
        external_id: req.external_id,
        email: req.email,
        name: req.name,
        avatar: req.avatar,
    };

    match accounts.external_login(identity).await {
        Ok(account) => respond_with_session(
            false,
            "User logged in successfully",
            account,
            jwt.get_ref(),
            cookies.get_ref(),
        ),
        Err(e) => error_response(&e),
    }
}

pub async fn logout(cookies: web::Data<CookieBuilder>) -> impl Responder {
    let mut response = json_response::<()>(
        actix_web::http::StatusCode::OK,
        true,
        "User logged out successfully",
        None,
        None,
    );
    let _ = response.add_cookie(&cookies.build_expired_auth_cookie());
    response
}

pub async fn current_user(identity: Identity) -> impl Responder {
    success_response(
        "Current user fetched successfully",
        UserEnvelope {
            user: UserResponse::from(identity.account),
        },
    )
}
