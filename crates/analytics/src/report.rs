use serde::{Deserialize, Serialize};
use std::fmt;

/// The valuation of a single property.
///
/// Money is in whole currency units, scores are integers in `[0, 100]`,
/// and every other figure is a fractional ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMetrics {
    // I. Value
    pub estimated_value: u64,
    pub price_per_sq_ft: u64,
    pub market_value_adjustment: f64,
    pub appreciation_rate: f64,

    // II. Income (commercial properties only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_on_cash_return: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi: Option<f64>,

    // III. Scores
    pub market_score: u8,
    pub liquidity_score: u8,
    /// Lower is safer.
    pub risk_score: u8,

    // IV. Relative position and carrying costs
    pub price_to_area_median: f64,
    pub value_percentile: u8,
    pub tax_burden: f64,
    pub maintenance_cost_estimate: u64,
    pub insurance_cost_estimate: u64,
}

/// The analysis of one owner's holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipAnalysis {
    pub portfolio_value: u64,
    pub portfolio_growth: f64,
    pub diversification_score: u8,
    pub concentration_risk: u8,
    pub leverage_ratio: f64,
    pub liquidity_ratio: f64,
    pub performance_score: u8,
}

impl OwnershipAnalysis {
    /// The result for an owner with no holdings: nothing diversified, fully concentrated.
    pub fn empty(leverage_ratio: f64) -> Self {
        Self {
            portfolio_value: 0,
            portfolio_growth: 0.0,
            diversification_score: 0,
            concentration_risk: 100,
            leverage_ratio,
            liquidity_ratio: 0.0,
            performance_score: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketTrend {
    Bullish,
    Bearish,
    Stable,
}

impl fmt::Display for MarketTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MarketTrend::Bullish => "bullish",
            MarketTrend::Bearish => "bearish",
            MarketTrend::Stable => "stable",
        })
    }
}

/// Statistics for a slice of the market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub median_price: u64,
    pub average_price: u64,
    pub price_growth: f64,
    pub inventory: usize,
    pub days_on_market: u32,
    pub absorption: f64,
    pub market_trend: MarketTrend,
    pub competitive_index: u8,
}

impl MarketAnalysis {
    /// The result for a slice with no priced property.
    pub fn empty(location: Option<String>, days_on_market: u32) -> Self {
        Self {
            location,
            median_price: 0,
            average_price: 0,
            price_growth: 0.0,
            inventory: 0,
            days_on_market,
            absorption: 0.0,
            market_trend: MarketTrend::Stable,
            competitive_index: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_fields_are_omitted_when_absent() {
        let metrics = PropertyMetrics {
            estimated_value: 1,
            price_per_sq_ft: 1,
            market_value_adjustment: 0.0,
            appreciation_rate: 0.03,
            cap_rate: None,
            cash_on_cash_return: None,
            roi: None,
            market_score: 50,
            liquidity_score: 50,
            risk_score: 30,
            price_to_area_median: 0.0,
            value_percentile: 1,
            tax_burden: 0.0,
            maintenance_cost_estimate: 0,
            insurance_cost_estimate: 0,
        };
        let json = serde_json::to_value(&metrics).unwrap();
        assert!(json.get("capRate").is_none());
        assert!(json.get("roi").is_none());
        assert_eq!(json["estimatedValue"], 1);
        assert_eq!(json["pricePerSqFt"], 1);
    }

    #[test]
    fn trend_serializes_lowercase() {
        let json = serde_json::to_value(MarketAnalysis::empty(None, 90)).unwrap();
        assert_eq!(json["marketTrend"], "stable");
        assert!(json.get("location").is_none());
    }
}
