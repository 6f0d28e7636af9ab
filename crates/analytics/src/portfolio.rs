use crate::engine::ValuationEngine;
use crate::error::AnalyticsError;
use crate::random::RandomSource;
use crate::report::OwnershipAnalysis;
use crate::stats::{herfindahl, histogram, mean, round_to, score, whole_units};
use core_types::{PropertyRecord, PropertyType};
use serde_json::Value;

/// Number of property classes a fully diversified owner holds.
const KNOWN_CLASSES: f64 = PropertyType::KNOWN.len() as f64;

/// Aggregates one owner's holdings into an `OwnershipAnalysis`.
///
/// Growth is the mean appreciation the valuation engine assigns each holding,
/// so the analyzer borrows the engine rather than duplicating its model.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioAnalyzer<'a> {
    engine: &'a ValuationEngine,
}

impl<'a> PortfolioAnalyzer<'a> {
    pub fn new(engine: &'a ValuationEngine) -> Self {
        Self { engine }
    }

    pub fn analyze_owner_portfolio<R: RandomSource + ?Sized>(
        &self,
        properties: &[PropertyRecord],
        rng: &mut R,
    ) -> OwnershipAnalysis {
        let settings = &self.engine.settings().portfolio;

        if properties.is_empty() {
            return OwnershipAnalysis::empty(settings.leverage_ratio);
        }
        let count = properties.len() as f64;

        let portfolio_value: f64 = properties.iter().map(|p| p.market_value()).sum();

        // --- Class mix ---
        let types = histogram(properties.iter().map(|p| p.kind()));
        let max_type_share = types.values().copied().max().unwrap_or(0) as f64 / count;
        let diversification_score = score(
            (types.len() as f64 / KNOWN_CLASSES) * 50.0 + (1.0 - max_type_share) * 50.0,
            0.0,
            100.0,
        );
        let concentration_risk = score(herfindahl(&types) * 100.0, 0.0, 100.0);

        // --- Geographic mix ---
        let cities = histogram(properties.iter().map(|p| p.city_name().unwrap_or("Unknown")));
        let geo_hhi = herfindahl(&cities);

        // --- Growth ---
        let rates: Vec<f64> = properties
            .iter()
            .map(|p| {
                self.engine
                    .calculate_property_valuation(p, None, &mut *rng)
                    .appreciation_rate
            })
            .collect();
        let portfolio_growth = mean(&rates).unwrap_or(0.0);

        let liquid = properties
            .iter()
            .filter(|p| {
                p.kind() == PropertyType::Residential
                    && p.market_value() < settings.liquid_value_threshold
            })
            .count();
        let liquidity_ratio = round_to(liquid as f64 / count, 2);

        let performance_score = score(
            f64::from(diversification_score) * 0.3
                + f64::from(100 - concentration_risk) * 0.2
                + (100.0 - geo_hhi * 100.0) * 0.2
                + (portfolio_growth * 1000.0).min(100.0) * 0.3,
            0.0,
            100.0,
        );

        tracing::debug!(
            holdings = properties.len(),
            classes = types.len(),
            cities = cities.len(),
            performance_score,
            "Portfolio analysed"
        );

        OwnershipAnalysis {
            portfolio_value: whole_units(portfolio_value),
            portfolio_growth,
            diversification_score,
            concentration_risk,
            leverage_ratio: settings.leverage_ratio,
            liquidity_ratio,
            performance_score,
        }
    }

    /// Analyses holdings given as loosely-typed JSON. The root must be an array.
    pub fn analyze_json<R: RandomSource + ?Sized>(
        &self,
        properties: &Value,
        rng: &mut R,
    ) -> Result<OwnershipAnalysis, AnalyticsError> {
        let properties = PropertyRecord::list_from_json(properties)?;
        Ok(self.analyze_owner_portfolio(&properties, rng))
    }
}
