//! HTTP surface tests
//!
//! Drives the actix service end to end: redirect outcomes as 307s to the
//! right locations, the 410 for unknown aliases, the response envelope, and
//! the cookie-based session flow.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use chrono::{Duration, Utc};
use tempfile::TempDir;

use curtail::api::cookies::{AUTH_COOKIE_NAME, CookieBuilder};
use curtail::api::jwt::JwtService;
use curtail::api::routes;
use curtail::config::{ApiConfig, DatabaseConfig, UrlConfig};
use curtail::services::{
    AccountService, AnalyticsService, LinkCreationService, ResolutionService,
};
use curtail::storage::{Link, SeaOrmStore, StorageFactory};
use curtail::utils::password::hash_password;

async fn create_test_store() -> (Arc<SeaOrmStore>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test_api.db");
    let config = DatabaseConfig {
        database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
        ..Default::default()
    };

    let store = StorageFactory::create(&config)
        .await
        .expect("Failed to create storage");
    (store, temp_dir)
}

fn test_urls() -> UrlConfig {
    UrlConfig {
        base_url: "http://short.test".to_string(),
        frontend_url: "http://front.test".to_string(),
    }
}

fn make_link(alias: &str, target: &str) -> Link {
    let now = Utc::now();
    Link {
        id: uuid::Uuid::new_v4().to_string(),
        alias: alias.to_string(),
        target: target.to_string(),
        click_count: 0,
        owner_id: None,
        qr_code: None,
        qr_generated: false,
        expires_at: None,
        active_from: now - Duration::minutes(1),
        is_expired: false,
        password_hash: None,
        is_password_protected: false,
        created_at: now,
        updated_at: now,
    }
}

/// Build the full service wired the same way main() wires it.
macro_rules! test_app {
    ($store:expr) => {{
        let urls = test_urls();
        test::init_service(
            App::new()
                .app_data(web::Data::new($store.clone()))
                .app_data(web::Data::new(JwtService::new(
                    "integration-test-secret-32-bytes!",
                    6,
                )))
                .app_data(web::Data::new(CookieBuilder::from_config(
                    &ApiConfig::default(),
                )))
                .app_data(web::Data::new(LinkCreationService::new(
                    $store.clone(),
                    urls.clone(),
                    7,
                )))
                .app_data(web::Data::new(ResolutionService::new(
                    $store.clone(),
                    urls.clone(),
                )))
                .app_data(web::Data::new(AnalyticsService::new($store.clone())))
                .app_data(web::Data::new(AccountService::new($store.clone())))
                .app_data(web::Data::new(urls))
                .configure(routes::api_routes)
                .configure(routes::redirect_routes),
        )
        .await
    }};
}

fn location_header(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get("Location")
        .expect("Location header present")
        .to_str()
        .unwrap()
        .to_string()
}

mod redirect_surface {
    use super::*;

    #[actix_rt::test]
    async fn test_unknown_alias_answers_410() {
        let (store, _temp) = create_test_store().await;
        let app = test_app!(store);

        let req = TestRequest::get().uri("/nonexistent").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::GONE);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
    }

    #[actix_rt::test]
    async fn test_live_link_redirects_to_target() {
        let (store, _temp) = create_test_store().await;
        store
            .insert_link(&make_link("golive", "https://example.com/landing"))
            .await
            .unwrap();

        let app = test_app!(store);
        let req = TestRequest::get().uri("/golive").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location_header(&resp), "https://example.com/landing");
    }

    #[actix_rt::test]
    async fn test_expired_link_redirects_to_expired_page() {
        let (store, _temp) = create_test_store().await;
        let mut link = make_link("bygone", "https://example.com");
        link.expires_at = Some(Utc::now() - Duration::days(1));
        store.insert_link(&link).await.unwrap();

        let app = test_app!(store);
        let req = TestRequest::get().uri("/bygone").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = location_header(&resp);
        assert!(location.starts_with("http://front.test/link-expired?expiredAt="));
        assert!(location.contains("shortUrl=bygone"));
    }

    #[actix_rt::test]
    async fn test_inactive_link_redirects_to_not_active_page() {
        let (store, _temp) = create_test_store().await;
        let mut link = make_link("pending", "https://example.com");
        link.active_from = Utc::now() + Duration::hours(2);
        store.insert_link(&link).await.unwrap();

        let app = test_app!(store);
        let req = TestRequest::get().uri("/pending").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        let location = location_header(&resp);
        assert!(location.starts_with("http://front.test/link-not-active?activeFrom="));
        // The full short link rides along, URL-encoded.
        assert!(location.contains("shortUrl=http%3A%2F%2Fshort.test%2Fpending"));
    }

    #[actix_rt::test]
    async fn test_protected_link_redirects_to_password_page() {
        let (store, _temp) = create_test_store().await;
        let mut link = make_link("locked", "https://example.com");
        link.password_hash = Some(hash_password("letmein123").unwrap());
        link.is_password_protected = true;
        store.insert_link(&link).await.unwrap();

        let app = test_app!(store);
        let req = TestRequest::get().uri("/locked").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location_header(&resp), "http://front.test/protected/locked");
    }
}

mod password_endpoint {
    use super::*;

    async fn seed_protected(store: &SeaOrmStore) {
        let mut link = make_link("vault", "https://example.com/hidden");
        link.password_hash = Some(hash_password("letmein123").unwrap());
        link.is_password_protected = true;
        store.insert_link(&link).await.unwrap();
    }

    #[actix_rt::test]
    async fn test_missing_password_is_bad_request() {
        let (store, _temp) = create_test_store().await;
        seed_protected(&store).await;

        let app = test_app!(store);
        let req = TestRequest::post()
            .uri("/api/links/verify-password")
            .set_json(serde_json::json!({"shortUrl": "vault", "password": ""}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_rt::test]
    async fn test_wrong_password_is_unauthorized() {
        let (store, _temp) = create_test_store().await;
        seed_protected(&store).await;

        let app = test_app!(store);
        let req = TestRequest::post()
            .uri("/api/links/verify-password")
            .set_json(serde_json::json!({"shortUrl": "vault", "password": "nope-nope"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Incorrect password");
    }

    #[actix_rt::test]
    async fn test_correct_password_returns_target() {
        let (store, _temp) = create_test_store().await;
        seed_protected(&store).await;

        let app = test_app!(store);
        let req = TestRequest::post()
            .uri("/api/links/verify-password")
            .set_json(serde_json::json!({"shortUrl": "vault", "password": "letmein123"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["fullUrl"], "https://example.com/hidden");
    }
}

mod session_flow {
    use super::*;

    #[actix_rt::test]
    async fn test_anonymous_create_then_resolve() {
        let (store, _temp) = create_test_store().await;
        let app = test_app!(store);

        let req = TestRequest::post()
            .uri("/api/links")
            .set_json(serde_json::json!({"url": "https://example.com/deep"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        let short_url = body["data"]["shortUrl"].as_str().unwrap();
        let alias = short_url.rsplit('/').next().unwrap().to_string();
        assert_eq!(alias.len(), 7);
        // Guests never receive a QR code.
        assert!(body["data"]["qrCode"].is_null());

        let req = TestRequest::get().uri(&format!("/{}", alias)).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location_header(&resp), "https://example.com/deep");
    }

    #[actix_rt::test]
    async fn test_owned_endpoints_require_identity() {
        let (store, _temp) = create_test_store().await;
        let app = test_app!(store);

        let req = TestRequest::get().uri("/api/links").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = TestRequest::get().uri("/api/auth/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_signup_sets_session_cookie() {
        let (store, _temp) = create_test_store().await;
        let app = test_app!(store);

        let req = TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "hunter2hunter2"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == AUTH_COOKIE_NAME)
            .expect("session cookie set")
            .into_owned();
        assert!(!cookie.value().is_empty());

        // The cookie authenticates subsequent requests.
        let req = TestRequest::get()
            .uri("/api/auth/me")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["user"]["email"], "ada@example.com");
        assert_eq!(body["data"]["user"]["provider"], "local");
    }

    #[actix_rt::test]
    async fn test_signup_validation_reports_fields() {
        let (store, _temp) = create_test_store().await;
        let app = test_app!(store);

        let req = TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(serde_json::json!({
                "name": "A",
                "email": "not-an-email",
                "password": "short"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        let errors = body["errors"].as_array().expect("field error list");
        assert_eq!(errors.len(), 3);
    }

    #[actix_rt::test]
    async fn test_owned_create_returns_qr_and_lists() {
        let (store, _temp) = create_test_store().await;
        let app = test_app!(store);

        let req = TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "hunter2hunter2"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == AUTH_COOKIE_NAME)
            .unwrap()
            .into_owned();

        let req = TestRequest::post()
            .uri("/api/links")
            .cookie(cookie.clone())
            .set_json(serde_json::json!({
                "url": "https://example.com/campaign",
                "slug": "launch"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["shortUrl"], "http://short.test/launch");
        assert!(
            body["data"]["qrCode"]
                .as_str()
                .unwrap()
                .starts_with("data:image/svg+xml;base64,")
        );

        let req = TestRequest::get()
            .uri("/api/links")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        let urls = body["data"]["urls"].as_array().unwrap();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0]["alias"], "launch");
    }

    #[actix_rt::test]
    async fn test_duplicate_slug_answers_conflict() {
        let (store, _temp) = create_test_store().await;
        let app = test_app!(store);

        let req = TestRequest::post()
            .uri("/api/auth/signup")
            .set_json(serde_json::json!({
                "name": "Ada",
                "email": "ada@example.com",
                "password": "hunter2hunter2"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let cookie = resp
            .response()
            .cookies()
            .find(|c| c.name() == AUTH_COOKIE_NAME)
            .unwrap()
            .into_owned();

        for expected in [StatusCode::CREATED, StatusCode::CONFLICT] {
            let req = TestRequest::post()
                .uri("/api/links")
                .cookie(cookie.clone())
                .set_json(serde_json::json!({
                    "url": "https://example.com",
                    "slug": "taken"
                }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected);
        }
    }
}
