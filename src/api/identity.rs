//! Identity extraction
//!
//! The resolved identity travels into handlers as an explicit extractor
//! value ([`Identity`] required, [`MaybeIdentity`] optional) and from there
//! into services as a plain parameter. Nothing mutates request state.

use actix_web::{Error, FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use std::sync::Arc;

use crate::api::cookies::AUTH_COOKIE_NAME;
use crate::api::jwt::JwtService;
use crate::api::responses::error_response;
use crate::errors::ServiceError;
use crate::storage::{Account, SeaOrmStore};

/// An authenticated requester.
#[derive(Debug, Clone)]
pub struct Identity {
    pub account: Account,
}

/// An optionally-authenticated requester. Extraction never fails; a
/// missing or invalid token simply yields `None`.
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

async fn load_identity(req: &HttpRequest) -> Option<Identity> {
    let token = req.cookie(AUTH_COOKIE_NAME)?.value().to_string();

    let jwt = req.app_data::<web::Data<JwtService>>()?;
    let claims = jwt.validate_token(&token).ok()?;

    let store = req.app_data::<web::Data<Arc<SeaOrmStore>>>()?;
    let account = store.find_account_by_id(&claims.sub).await.ok()??;

    Some(Identity { account })
}

impl FromRequest for MaybeIdentity {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { Ok(MaybeIdentity(load_identity(&req).await)) })
    }
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            load_identity(&req).await.ok_or_else(|| {
                actix_web::error::InternalError::from_response(
                    "unauthorized",
                    error_response(&ServiceError::unauthorized(
                        "Unauthorized: missing or invalid token",
                    )),
                )
                .into()
            })
        })
    }
}
