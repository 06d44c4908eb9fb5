//! Route wiring
//!
//! The API scope is registered before the catch-all alias route so
//! `/api/...` never resolves as a short link.

use actix_web::web;

use super::handlers::{analytics, auth, links, redirect};

pub fn api_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .route("/login", web::post().to(auth::login))
                    .route("/external", web::post().to(auth::external_login))
                    .route("/logout", web::post().to(auth::logout))
                    .route("/me", web::get().to(auth::current_user)),
            )
            .service(
                web::scope("/links")
                    .route("", web::post().to(links::create_link))
                    .route("", web::get().to(links::list_links))
                    .route(
                        "/verify-password",
                        web::post().to(redirect::verify_password),
                    )
                    .route(
                        "/{alias}/analytics",
                        web::get().to(analytics::link_analytics),
                    )
                    .route("/{id}", web::patch().to(links::update_link))
                    .route("/{id}", web::delete().to(links::delete_link)),
            ),
    );
}

/// Catch-all short-link resolution; must be registered last.
pub fn redirect_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{alias}", web::get().to(redirect::handle_redirect))
        .route("/{alias}", web::head().to(redirect::handle_redirect));
}
