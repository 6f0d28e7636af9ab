use crate::{error::AppError, AppState};
use analytics::{with_rng, MarketAnalysis, OwnershipAnalysis, PropertyMetrics};
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Body of `POST /api/valuation`.
#[derive(Debug, Deserialize)]
pub struct ValuationRequest {
    #[serde(default)]
    pub property: Value,
    #[serde(default)]
    pub comparables: Option<Value>,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Body of `POST /api/portfolio/analyze`.
#[derive(Debug, Deserialize)]
pub struct PortfolioRequest {
    #[serde(default)]
    pub properties: Value,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Body of `POST /api/market/analyze`.
#[derive(Debug, Deserialize)]
pub struct MarketRequest {
    #[serde(default)]
    pub properties: Value,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

/// # POST /api/valuation
/// Values a single property, optionally against comparables.
pub async fn value_property(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ValuationRequest>,
) -> Result<Json<PropertyMetrics>, AppError> {
    let metrics = with_rng(request.seed, |rng| {
        state
            .engine
            .valuation_from_json(&request.property, request.comparables.as_ref(), rng)
    })?;
    Ok(Json(metrics))
}

/// # POST /api/portfolio/analyze
/// Analyses one owner's holdings.
pub async fn analyze_portfolio(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PortfolioRequest>,
) -> Result<Json<OwnershipAnalysis>, AppError> {
    let analysis = with_rng(request.seed, |rng| {
        state
            .engine
            .portfolio_analyzer()
            .analyze_json(&request.properties, rng)
    })?;
    Ok(Json(analysis))
}

/// # POST /api/market/analyze
/// Summarises a market slice.
pub async fn analyze_market(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MarketRequest>,
) -> Result<Json<MarketAnalysis>, AppError> {
    let analysis = with_rng(request.seed, |rng| {
        state
            .engine
            .market_analyzer()
            .analyze_json(&request.properties, request.location.as_deref(), rng)
    })?;
    Ok(Json(analysis))
}
