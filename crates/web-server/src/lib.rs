use analytics::ValuationEngine;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use configuration::ValuationSettings;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Debug, Clone)]
pub struct AppState {
    pub engine: ValuationEngine,
}

impl AppState {
    pub fn new(settings: ValuationSettings) -> Result<Self, analytics::AnalyticsError> {
        Ok(Self {
            engine: ValuationEngine::new(settings)?,
        })
    }
}

/// Builds the application router over the given state.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/valuation", post(handlers::value_property))
        .route("/api/portfolio/analyze", post(handlers::analyze_portfolio))
        .route("/api/market/analyze", post(handlers::analyze_market))
        .with_state(Arc::new(state))
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024 * 10)) // Portfolios of a few thousand records fit in 10MB
}

/// The main function to configure and run the web server.
///
/// Tracing is expected to be initialised by the caller.
pub async fn run_server(addr: SocketAddr, settings: ValuationSettings) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    tracing::info!(
        current_year = state.engine.current_year(),
        "Valuation engine ready"
    );

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
