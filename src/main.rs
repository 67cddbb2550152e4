//! Anime Gateway API Server
//!
//! Main entry point for the anime gateway REST API service.

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use anime_gateway::cache::{SuggestionsCache, SUGGESTIONS_TTL};
use anime_gateway::clients::ApiClient;
use anime_gateway::config::Config;
use anime_gateway::routes::{configure_routes, ApiDoc, AppState};
use anime_gateway::scraper::Scraper;

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_address = format!("{}:{}", config.host, config.port);

    let app_state = web::Data::new(AppState {
        config,
        scraper: Scraper::new(),
        api: ApiClient::new(),
        suggestions: SuggestionsCache::new(SUGGESTIONS_TTL),
    });

    info!("Starting Anime Gateway API server on {}", bind_address);

    let openapi = ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .route("/health", web::get().to(health_check))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
