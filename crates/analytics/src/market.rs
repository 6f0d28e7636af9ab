use crate::error::AnalyticsError;
use crate::random::RandomSource;
use crate::report::{MarketAnalysis, MarketTrend};
use crate::stats::{mean, median, population_variance, score, whole_units};
use configuration::MarketSettings;
use core_types::PropertyRecord;
use serde_json::Value;

/// Aggregates a slice of the market into price statistics and a trend call.
#[derive(Debug, Clone)]
pub struct MarketAnalyzer {
    settings: MarketSettings,
}

impl MarketAnalyzer {
    pub fn new(settings: MarketSettings) -> Self {
        Self { settings }
    }

    pub fn analyze_market<R: RandomSource + ?Sized>(
        &self,
        properties: &[PropertyRecord],
        location: Option<&str>,
        rng: &mut R,
    ) -> MarketAnalysis {
        let s = &self.settings;
        let location = location.map(str::to_string);

        // Unpriced records are not $0 listings; they stay out of the statistics.
        let prices: Vec<f64> = properties
            .iter()
            .map(|p| p.market_value())
            .filter(|v| *v > 0.0)
            .collect();

        let (Some(median_price), Some(average_price), Some(variance)) =
            (median(&prices), mean(&prices), population_variance(&prices))
        else {
            return MarketAnalysis::empty(location, s.default_days_on_market);
        };

        let price_growth =
            s.base_price_growth + rng.uniform(-s.price_growth_spread, s.price_growth_spread);
        let days_on_market = rng
            .uniform(s.days_on_market_min, s.days_on_market_max)
            .round() as u32;

        let inventory = properties.len();
        let absorption = (inventory as f64 / 100.0).clamp(0.1, 2.0);
        let competitive_index = score(50.0 + (variance / average_price) * 100.0, 0.0, 100.0);

        let analysis = MarketAnalysis {
            location,
            median_price: whole_units(median_price),
            average_price: whole_units(average_price),
            price_growth,
            inventory,
            days_on_market,
            absorption,
            market_trend: self.classify(price_growth),
            competitive_index,
        };

        tracing::debug!(
            location = analysis.location.as_deref().unwrap_or("<all>"),
            inventory,
            trend = %analysis.market_trend,
            "Market analysed"
        );

        analysis
    }

    /// Analyses a market slice given as loosely-typed JSON. The root must be an array.
    pub fn analyze_json<R: RandomSource + ?Sized>(
        &self,
        properties: &Value,
        location: Option<&str>,
        rng: &mut R,
    ) -> Result<MarketAnalysis, AnalyticsError> {
        let properties = PropertyRecord::list_from_json(properties)?;
        Ok(self.analyze_market(&properties, location, rng))
    }

    pub fn classify(&self, price_growth: f64) -> MarketTrend {
        if price_growth > self.settings.bullish_threshold {
            MarketTrend::Bullish
        } else if price_growth < self.settings.bearish_threshold {
            MarketTrend::Bearish
        } else {
            MarketTrend::Stable
        }
    }
}
