//! DFK Heroes Price Dashboard Server
//!
//! Serves hero price predictions, their explanations and the dataset charts.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  HERO PRICE DASHBOARD                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌─────────────────┐  ┌───────────────────┐ │
//! │  │  API      │  │  Predict +      │  │  Charts           │ │
//! │  │  Gateway  │  │  Explain        │  │  (Vega-Lite)      │ │
//! │  │  (Axum)   │  │  (TreeSHAP)     │  │                   │ │
//! │  └─────┬─────┘  └────────┬────────┘  └─────────┬─────────┘ │
//! │        └─────────────────┼─────────────────────┘           │
//! │                          ▼                                  │
//! │               ┌────────────────────┐                       │
//! │               │ PredictionContext  │                       │
//! │               │ (artifact dir)     │                       │
//! │               └────────────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod handlers;
mod error;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use hero_price_core::constants::APP_NAME;
use hero_price_core::PredictionContext;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();

    // Initialize logging, core `log` records included
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "hero_price_dashboard=debug,hero_price_core=info,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = config::Config::from_env();
    tracing::info!("{} dashboard starting ({})...", APP_NAME, config.environment);
    if !config.is_production() {
        tracing::debug!(?config, "Configuration");
    }
    tracing::info!("Artifacts: {}", config.artifact_dir.display());

    let context = PredictionContext::load(&config.artifact_dir)
        .with_context(|| format!("failed to load artifacts from {}", config.artifact_dir.display()))?;

    // Build application state
    let state = AppState {
        context: Arc::new(context),
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub context: Arc<PredictionContext>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let prediction_routes = Router::new()
        .route("/api/v1/predict/:hero_id", get(handlers::predict::predict))
        .route("/api/v1/predict/:hero_id/waterfall.svg", get(handlers::predict::waterfall_svg));

    let chart_routes = Router::new()
        .route("/api/v1/charts/price-distribution", get(handlers::charts::price_distribution))
        .route("/api/v1/charts/price-explanation", get(handlers::charts::price_explanation))
        .route("/api/v1/charts/advanced-analytics", get(handlers::charts::advanced_analytics));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/api/v1/dataset", get(handlers::dataset::describe))
        .merge(prediction_routes)
        .merge(chart_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
