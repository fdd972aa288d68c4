use std::sync::Arc;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use studiobook::config::AppConfig;
use studiobook::db::{self, SqliteStore};
use studiobook::handlers;
use studiobook::models::StudioConfig;
use studiobook::services::submission::formspree::FormspreeClient;
use studiobook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let studio = match &config.studio_config_path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read studio config {path}"))?;
            StudioConfig::from_json(&raw).with_context(|| format!("invalid studio config {path}"))?
        }
        None => StudioConfig::default(),
    };
    tracing::info!(
        studio = %studio.name,
        services = studio.services.len(),
        slots = studio.time_slots.len(),
        "loaded studio configuration"
    );

    let conn = db::init_db(&config.storage_path)?;
    let backend = Arc::new(SqliteStore::new(conn));

    let submitter = match &config.submission_endpoint {
        Some(endpoint) => FormspreeClient::new(endpoint.clone()),
        None => FormspreeClient::for_form(&config.booking_form_id),
    };

    let state = Arc::new(AppState::new(
        config.clone(),
        studio,
        backend,
        Box::new(submitter),
    ));
    tracing::info!(
        bookings = state.store.lock().unwrap().len(),
        "booking store loaded"
    );

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/calendar/:year/:month",
            get(handlers::calendar::month_view),
        )
        .route("/api/slots", get(handlers::calendar::slots))
        .route("/api/flow", get(handlers::flow::get_flow))
        .route("/api/flow/date", post(handlers::flow::select_date))
        .route("/api/flow/service", post(handlers::flow::select_service))
        .route("/api/flow/submit", post(handlers::flow::submit))
        .route("/api/flow/reset", post(handlers::flow::reset))
        .route("/api/notification", get(handlers::notification::current))
        .route(
            "/api/notification/:id/dismiss",
            post(handlers::notification::dismiss),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
