//! Interactive redirect surface
//!
//! The resolution outcomes render as 307 redirects: to the target on
//! success, to descriptive frontend pages for the expired / not-active /
//! password-required cases. Unknown aliases answer 410 Gone. This surface
//! does not use the API envelope except for the Gone body and the
//! password-verification endpoint.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::api::responses::{error_response, json_response, success_response};
use crate::config::UrlConfig;
use crate::errors::ServiceError;
use crate::services::{Outcome, ResolutionService, VisitorInfo};
use crate::utils::ip::extract_client_ip;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPasswordRequest {
    /// The alias of the protected link.
    pub short_url: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPasswordResponse {
    pub full_url: String,
}

fn visitor_from_request(req: &HttpRequest) -> VisitorInfo {
    VisitorInfo {
        address: extract_client_ip(req),
        user_agent: req
            .headers()
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .map(String::from),
    }
}

fn temporary_redirect(location: &str) -> HttpResponse {
    HttpResponse::build(StatusCode::TEMPORARY_REDIRECT)
        .insert_header(("Location", location))
        .finish()
}

fn gone_response() -> HttpResponse {
    json_response::<()>(
        StatusCode::GONE,
        false,
        "This link has expired or does not exist",
        None,
        None,
    )
}

/// Resolve an alias and answer with the matching redirect.
pub async fn handle_redirect(
    req: HttpRequest,
    path: web::Path<String>,
    resolution: web::Data<ResolutionService>,
    urls: web::Data<UrlConfig>,
) -> impl Responder {
    let alias = path.into_inner();
    let visitor = visitor_from_request(&req);

    match resolution.resolve(&alias, &visitor).await {
        Ok(Outcome::Redirect { target }) => temporary_redirect(&target),
        Ok(Outcome::Expired { expired_at, alias }) => {
            debug!("Expired link hit: {}", alias);
            let location = format!(
                "{}?expiredAt={}&shortUrl={}",
                urls.frontend_page("link-expired"),
                urlencoding::encode(&expired_at.to_rfc3339()),
                urlencoding::encode(&alias)
            );
            temporary_redirect(&location)
        }
        Ok(Outcome::NotActive {
            active_from,
            short_link,
        }) => {
            let location = format!(
                "{}?activeFrom={}&shortUrl={}",
                urls.frontend_page("link-not-active"),
                urlencoding::encode(&active_from.to_rfc3339()),
                urlencoding::encode(&short_link)
            );
            temporary_redirect(&location)
        }
        Ok(Outcome::PasswordRequired { alias }) => {
            temporary_redirect(&urls.frontend_page(&format!("protected/{}", alias)))
        }
        Ok(Outcome::Gone) => gone_response(),
        Err(e) => {
            error!("Resolution failed for '{}': {}", alias, e);
            error_response(&e)
        }
    }
}

/// Unlock a password-protected link; the response carries the target URL.
pub async fn verify_password(
    req: HttpRequest,
    payload: web::Json<VerifyPasswordRequest>,
    resolution: web::Data<ResolutionService>,
) -> impl Responder {
    let body = payload.into_inner();

    if body.password.is_empty() {
        return error_response(&ServiceError::bad_request("Password is required"));
    }

    let visitor = visitor_from_request(&req);

    match resolution
        .verify_link_password(&body.short_url, &body.password, &visitor)
        .await
    {
        Ok(target) => success_response(
            "Password verified",
            VerifyPasswordResponse { full_url: target },
        ),
        Err(e) => error_response(&e),
    }
}
