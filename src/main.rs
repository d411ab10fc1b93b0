use actix_cors::Cors;
use actix_web::middleware::{Logger, NormalizePath, TrailingSlash};
use actix_web::{App, HttpServer, web};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod db;
mod model;
mod service;

use app::AppState;
use model::{Config, CorsConfig};

fn build_cors(config: &CorsConfig) -> Cors {
    if config.allows_any() {
        return Cors::permissive();
    }

    config
        .allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr();

    let state = AppState::new(&config).await.map_err(|e| {
        tracing::error!(error = %e, "Startup failed");
        std::io::Error::other(e)
    })?;

    let db_pool = web::Data::new(state.db_pool);
    let users = web::Data::from(state.users);
    let patients = web::Data::new(state.patients);
    let cases = web::Data::new(state.cases);
    let analyzer = web::Data::from(state.analyzer);
    let case_service = web::Data::from(state.case_service);
    let tokens = web::Data::from(state.tokens);
    let cors = config.cors;

    tracing::info!("Starting Reperto backend on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .wrap(build_cors(&cors))
            .wrap(Logger::default())
            .app_data(db_pool.clone())
            .app_data(users.clone())
            .app_data(patients.clone())
            .app_data(cases.clone())
            .app_data(analyzer.clone())
            .app_data(case_service.clone())
            .app_data(tokens.clone())
            .configure(api::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
