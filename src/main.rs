use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use tracing::info;

use curtail::api::cookies::CookieBuilder;
use curtail::api::jwt::JwtService;
use curtail::api::routes;
use curtail::config::AppConfig;
use curtail::logging::init_logging;
use curtail::services::{
    AccountService, AnalyticsService, LinkCreationService, ResolutionService,
};
use curtail::storage::StorageFactory;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("{}", e);
        std::process::exit(1);
    });

    let _log_guard = init_logging(&config.logging);

    let store = StorageFactory::create(&config.database)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    // Components receive their configuration at construction time.
    let jwt = web::Data::new(JwtService::from_config(&config.api));
    let cookie_builder = web::Data::new(CookieBuilder::from_config(&config.api));
    let creation = web::Data::new(LinkCreationService::new(
        store.clone(),
        config.urls.clone(),
        config.features.alias_length,
    ));
    let resolution = web::Data::new(ResolutionService::new(store.clone(), config.urls.clone()));
    let analytics = web::Data::new(AnalyticsService::new(store.clone()));
    let accounts = web::Data::new(AccountService::new(store.clone()));
    let urls = web::Data::new(config.urls.clone());
    let store_data = web::Data::new(store);

    let mut allowed_origins = config.api.allowed_origins.clone();
    if allowed_origins.is_empty() {
        allowed_origins.push(config.urls.frontend_url.trim_end_matches('/').to_string());
    }

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting curtail at http://{}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);
        for origin in &allowed_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .app_data(store_data.clone())
            .app_data(jwt.clone())
            .app_data(cookie_builder.clone())
            .app_data(creation.clone())
            .app_data(resolution.clone())
            .app_data(analytics.clone())
            .app_data(accounts.clone())
            .app_data(urls.clone())
            .configure(routes::api_routes)
            .configure(routes::redirect_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
