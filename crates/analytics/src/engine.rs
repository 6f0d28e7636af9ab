use crate::error::AnalyticsError;
use crate::market::MarketAnalyzer;
use crate::portfolio::PortfolioAnalyzer;
use crate::random::RandomSource;
use crate::report::PropertyMetrics;
use crate::scoring::{score_liquidity, score_market, score_risk};
use crate::stats::{median, score, whole_units};
use chrono::{Datelike, Utc};
use configuration::ValuationSettings;
use core_types::{PropertyRecord, PropertyType};
use serde_json::Value;

/// A stateless automated valuation model.
///
/// The engine multiplies a property's recorded value through a chain of
/// hedonic adjustments (age, location, class, market backdrop) and derives
/// carrying costs, income ratios and scores from the result. It holds only
/// immutable settings and can be shared freely between threads.
#[derive(Debug, Clone)]
pub struct ValuationEngine {
    settings: ValuationSettings,
    current_year: i32,
}

/// The unrounded intermediate figures of one valuation.
struct Estimate {
    value: f64,
    price_per_sq_ft: f64,
    age: i32,
}

impl ValuationEngine {
    /// Creates an engine after validating the settings.
    ///
    /// Ages are measured against `settings.current_year`, or the current UTC
    /// calendar year when that is unset.
    pub fn new(settings: ValuationSettings) -> Result<Self, AnalyticsError> {
        settings.validate()?;
        let current_year = settings.current_year.unwrap_or_else(|| Utc::now().year());
        Ok(Self {
            settings,
            current_year,
        })
    }

    /// Pins the year ages are measured against.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = year;
        self
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn settings(&self) -> &ValuationSettings {
        &self.settings
    }

    pub fn portfolio_analyzer(&self) -> PortfolioAnalyzer<'_> {
        PortfolioAnalyzer::new(self)
    }

    pub fn market_analyzer(&self) -> MarketAnalyzer {
        MarketAnalyzer::new(self.settings.market.clone())
    }

    /// The main entry point: values one property.
    ///
    /// # Arguments
    ///
    /// * `property` - The property to value. Missing fields take their documented defaults.
    /// * `comparables` - Optional similar properties; they only drive `market_value_adjustment`.
    /// * `rng` - The source of the appreciation noise.
    pub fn calculate_property_valuation<R: RandomSource + ?Sized>(
        &self,
        property: &PropertyRecord,
        comparables: Option<&[PropertyRecord]>,
        rng: &mut R,
    ) -> PropertyMetrics {
        let s = &self.settings;
        let estimate = self.estimate(property);
        let value = estimate.value;

        let market_value_adjustment = comparables
            .map(|comps| self.market_value_adjustment(estimate.price_per_sq_ft, comps))
            .unwrap_or(0.0);

        let appreciation_rate = self.appreciation_rate(rng);

        let (cap_rate, cash_on_cash_return, roi) = if property.kind() == PropertyType::Commercial {
            let (cap, coc, roi) = self.income_ratios(value, appreciation_rate);
            (Some(cap), Some(coc), Some(roi))
        } else {
            (None, None, None)
        };

        let market_score = score_market(property, estimate.price_per_sq_ft, &s.scoring);
        let liquidity_score = score_liquidity(property, self.current_year, &s.scoring);
        let risk_score = score_risk(property, estimate.age, market_score, &s.scoring);

        let price_to_area_median = value / s.national_median_price;
        let value_percentile = if value > 0.0 {
            score(50.0 + price_to_area_median.ln() * 20.0, 1.0, 99.0)
        } else {
            1
        };

        let tax_burden = if value > 0.0 {
            property.tax_amount.unwrap_or(value * s.default_tax_rate) / value
        } else {
            0.0
        };

        let metrics = PropertyMetrics {
            estimated_value: whole_units(value),
            price_per_sq_ft: whole_units(estimate.price_per_sq_ft),
            market_value_adjustment,
            appreciation_rate,
            cap_rate,
            cash_on_cash_return,
            roi,
            market_score,
            liquidity_score,
            risk_score,
            price_to_area_median,
            value_percentile,
            tax_burden,
            maintenance_cost_estimate: whole_units(value * s.maintenance_rate),
            insurance_cost_estimate: whole_units(value * s.insurance_rate),
        };

        tracing::debug!(
            address = property.address.as_deref().unwrap_or("<unknown>"),
            property_type = %property.kind(),
            estimated_value = metrics.estimated_value,
            risk_score = metrics.risk_score,
            "Property valued"
        );

        metrics
    }

    /// Values a property given as loosely-typed JSON.
    ///
    /// `comparables`, when present and not null, must be an array of objects.
    pub fn valuation_from_json<R: RandomSource + ?Sized>(
        &self,
        property: &Value,
        comparables: Option<&Value>,
        rng: &mut R,
    ) -> Result<PropertyMetrics, AnalyticsError> {
        let property = PropertyRecord::from_json(property)?;
        let comparables = match comparables {
            Some(Value::Null) | None => None,
            Some(value) => Some(PropertyRecord::list_from_json(value)?),
        };
        Ok(self.calculate_property_valuation(&property, comparables.as_deref(), rng))
    }

    /// Age in whole years; future build years count as new.
    pub fn age_of(&self, property: &PropertyRecord) -> i32 {
        let year_built = property.year_built.unwrap_or(self.settings.default_year_built);
        self.current_year.saturating_sub(year_built).max(0)
    }

    /// Non-linear age decay, never below the configured floor.
    pub fn age_depreciation(&self, age: i32) -> f64 {
        let s = &self.settings;
        let age = f64::from(age);
        let quadratic = age * s.depreciation_quadratic;
        (1.0 - age * s.depreciation_linear - quadratic * quadratic).max(s.depreciation_floor)
    }

    /// County income relative to the baseline, clamped. 1.0 when the income is unknown.
    pub fn location_multiplier(&self, property: &PropertyRecord) -> f64 {
        let s = &self.settings;
        match property.county_median_income() {
            Some(income) => (income / s.income_baseline)
                .clamp(s.location_multiplier_min, s.location_multiplier_max),
            None => 1.0,
        }
    }

    /// Expected appreciation plus market noise.
    pub fn appreciation_rate<R: RandomSource + ?Sized>(&self, rng: &mut R) -> f64 {
        let s = &self.settings;
        s.base_appreciation + rng.uniform(-s.appreciation_spread, s.appreciation_spread)
    }

    fn estimate(&self, property: &PropertyRecord) -> Estimate {
        let s = &self.settings;
        let age = self.age_of(property);

        // Extreme inputs saturate at the largest finite value.
        let value = (property.base_value()
            * self.age_depreciation(age)
            * self.location_multiplier(property)
            * s.type_multipliers.get(property.kind())
            * s.market_condition)
            .min(f64::MAX);

        let sq_ft = property.square_footage.unwrap_or(0.0).max(1.0);

        Estimate {
            value,
            price_per_sq_ft: value / sq_ft,
            age,
        }
    }

    /// Relative distance of our price per square foot from the comparables' median.
    fn market_value_adjustment(&self, own_price_per_sq_ft: f64, comparables: &[PropertyRecord]) -> f64 {
        let comp_prices: Vec<f64> = comparables
            .iter()
            .map(|c| c.base_value() / c.square_footage.unwrap_or(0.0).max(1.0))
            .filter(|p| p.is_finite() && *p > 0.0)
            .collect();

        if comp_prices.len() < comparables.len() {
            tracing::warn!(
                ignored = comparables.len() - comp_prices.len(),
                "Ignoring comparables without a usable value"
            );
        }

        match median(&comp_prices) {
            Some(m) if m > 0.0 => ((own_price_per_sq_ft - m) / m).clamp(-1.0, f64::MAX),
            _ => 0.0,
        }
    }

    /// Cap rate, cash-on-cash return and ROI of the simple rental model.
    fn income_ratios(&self, value: f64, appreciation_rate: f64) -> (f64, f64, f64) {
        if value <= 0.0 {
            return (0.0, 0.0, 0.0);
        }
        let s = &self.settings;
        let rent = value * s.rent_yield;
        let operating_expenses = rent * s.operating_expense_ratio;
        let noi = rent - operating_expenses;

        let cap_rate = noi / value;
        let cash_on_cash = noi / (value * s.down_payment_ratio);
        let roi = (noi + value * appreciation_rate) / value;
        (cap_rate, cash_on_cash, roi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{NoNoise, seeded};
    use core_types::AreaStats;
    use serde_json::json;

    fn engine() -> ValuationEngine {
        ValuationEngine::new(ValuationSettings::default())
            .unwrap()
            .with_current_year(2024)
    }

    fn residential() -> PropertyRecord {
        PropertyRecord {
            property_type: Some(PropertyType::Residential),
            current_value: Some(500_000.0),
            square_footage: Some(2_000.0),
            year_built: Some(2010),
            ..Default::default()
        }
    }

    #[test]
    fn residential_scenario() {
        let metrics = engine().calculate_property_valuation(&residential(), None, &mut seeded(7));

        // 500000 * 0.887804 * 1.05
        assert!((metrics.estimated_value as i64 - 466_097).abs() <= 1);
        assert_eq!(metrics.price_per_sq_ft, 233);
        assert_eq!(metrics.market_value_adjustment, 0.0);
        assert!((-0.0451..=0.1051).contains(&metrics.appreciation_rate));
        assert_eq!(metrics.market_score, 51);
        assert_eq!(metrics.liquidity_score, 75);
        assert_eq!(metrics.risk_score, 45);
        assert_eq!(metrics.value_percentile, 56);
        assert!((metrics.tax_burden - 0.012).abs() < 1e-12);
        assert_eq!(metrics.maintenance_cost_estimate, 6_991);
        assert_eq!(metrics.insurance_cost_estimate, 1_398);
        assert!((metrics.price_to_area_median - 466_097.1 / 350_000.0).abs() < 1e-6);
    }

    #[test]
    fn commercial_only_fields() {
        let engine = engine();
        let mut rng = NoNoise;

        for kind in [PropertyType::Residential, PropertyType::Land, PropertyType::Industrial] {
            let property = PropertyRecord {
                property_type: Some(kind),
                ..residential()
            };
            let metrics = engine.calculate_property_valuation(&property, None, &mut rng);
            assert_eq!(metrics.cap_rate, None);
            assert_eq!(metrics.cash_on_cash_return, None);
            assert_eq!(metrics.roi, None);
        }

        let commercial = PropertyRecord {
            property_type: Some(PropertyType::Commercial),
            ..residential()
        };
        let metrics = engine.calculate_property_valuation(&commercial, None, &mut rng);
        let cap_rate = metrics.cap_rate.unwrap();
        assert!((cap_rate - 0.052).abs() < 1e-12);
        assert!((metrics.cash_on_cash_return.unwrap() - 0.208).abs() < 1e-12);
        // NoNoise leaves appreciation at its 3% base.
        assert!((metrics.roi.unwrap() - 0.082).abs() < 1e-12);
    }

    #[test]
    fn missing_value_yields_zero_estimate() {
        let metrics = engine().calculate_property_valuation(
            &PropertyRecord {
                property_type: Some(PropertyType::Commercial),
                ..Default::default()
            },
            None,
            &mut NoNoise,
        );
        assert_eq!(metrics.estimated_value, 0);
        assert_eq!(metrics.price_per_sq_ft, 0);
        assert_eq!(metrics.value_percentile, 1);
        assert_eq!(metrics.tax_burden, 0.0);
        assert_eq!(metrics.cap_rate, Some(0.0));
    }

    #[test]
    fn depreciation_is_floored() {
        let engine = engine();
        assert_eq!(engine.age_depreciation(0), 1.0);
        assert_eq!(engine.age_depreciation(200), 0.7);
        assert!(engine.age_depreciation(30) > engine.age_depreciation(31));
    }

    #[test]
    fn default_build_year_and_future_builds() {
        let engine = engine();
        assert_eq!(engine.age_of(&PropertyRecord::default()), 24);
        let future = PropertyRecord {
            year_built: Some(2030),
            ..Default::default()
        };
        assert_eq!(engine.age_of(&future), 0);
    }

    #[test]
    fn location_multiplier_is_clamped() {
        let engine = engine();
        let with_income = |income: f64| PropertyRecord {
            county: Some(AreaStats {
                median_income: Some(income),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(engine.location_multiplier(&PropertyRecord::default()), 1.0);
        assert_eq!(engine.location_multiplier(&with_income(20_000.0)), 0.8);
        assert_eq!(engine.location_multiplier(&with_income(500_000.0)), 1.5);
        assert!((engine.location_multiplier(&with_income(78_000.0)) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn comparables_drive_market_value_adjustment() {
        let engine = engine();
        let own = engine.calculate_property_valuation(&residential(), None, &mut NoNoise);
        let own_ppsf = 500_000.0 * 0.887_804 * 1.05 / 2_000.0;

        // Comparable prices per sqft: 200, 250, 300 -> median 250.
        let comps: Vec<PropertyRecord> = [200.0, 300.0, 250.0]
            .iter()
            .map(|ppsf| PropertyRecord {
                current_value: Some(ppsf * 1_000.0),
                square_footage: Some(1_000.0),
                ..Default::default()
            })
            .chain(std::iter::once(PropertyRecord::default()))
            .collect();

        let metrics = engine.calculate_property_valuation(&residential(), Some(comps.as_slice()), &mut NoNoise);
        assert!((metrics.market_value_adjustment - (own_ppsf - 250.0) / 250.0).abs() < 1e-9);
        assert_eq!(metrics.estimated_value, own.estimated_value);

        let none_usable = vec![PropertyRecord::default()];
        let metrics =
            engine.calculate_property_valuation(&residential(), Some(none_usable.as_slice()), &mut NoNoise);
        assert_eq!(metrics.market_value_adjustment, 0.0);
    }

    #[test]
    fn explicit_tax_amount_is_used() {
        let property = PropertyRecord {
            tax_amount: Some(4_660.971),
            ..residential()
        };
        let metrics = engine().calculate_property_valuation(&property, None, &mut NoNoise);
        assert!((metrics.tax_burden - 0.01).abs() < 1e-6);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let engine = engine();
        let a = engine.calculate_property_valuation(&residential(), None, &mut seeded(99));
        let b = engine.calculate_property_valuation(&residential(), None, &mut seeded(99));
        assert_eq!(a, b);
    }

    #[test]
    fn json_entry_point_validates_roots() {
        let engine = engine();
        let metrics = engine
            .valuation_from_json(
                &json!({ "currentValue": 500000, "squareFootage": 2000, "yearBuilt": 2010, "propertyType": "residential" }),
                Some(&Value::Null),
                &mut NoNoise,
            )
            .unwrap();
        assert!((metrics.estimated_value as i64 - 466_097).abs() <= 1);

        let err = engine
            .valuation_from_json(&json!({}), Some(&json!({ "not": "a list" })), &mut NoNoise)
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));

        let err = engine
            .valuation_from_json(&json!([1, 2]), None, &mut NoNoise)
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }

    #[test]
    fn extreme_build_years_do_not_overflow() {
        let engine = engine();
        let ancient = PropertyRecord {
            year_built: Some(i32::MIN),
            ..residential()
        };
        assert_eq!(engine.age_of(&ancient), i32::MAX);

        let metrics = engine
            .valuation_from_json(
                &json!({ "currentValue": 500000, "yearBuilt": i32::MIN }),
                None,
                &mut NoNoise,
            )
            .unwrap();
        // Fully depreciated: 500000 * 0.7 * 1.05
        assert_eq!(metrics.estimated_value, 367_500);
        assert!(metrics.risk_score > 0);

        let far_future = PropertyRecord {
            year_built: Some(i32::MAX),
            ..residential()
        };
        assert_eq!(engine.age_of(&far_future), 0);
    }

    #[test]
    fn huge_values_keep_every_output_finite() {
        let engine = engine();
        let property = PropertyRecord {
            property_type: Some(PropertyType::Commercial),
            current_value: Some(1.7e308),
            square_footage: Some(1.0),
            year_built: Some(2024),
            county: Some(AreaStats {
                median_income: Some(1.0e9),
                ..Default::default()
            }),
            ..Default::default()
        };
        let comparables = [PropertyRecord {
            current_value: Some(1.0),
            square_footage: Some(1.0e6),
            ..Default::default()
        }];

        let metrics =
            engine.calculate_property_valuation(&property, Some(comparables.as_slice()), &mut NoNoise);

        assert_eq!(metrics.estimated_value, u64::MAX);
        assert!(metrics.tax_burden.is_finite());
        assert!(metrics.price_to_area_median.is_finite());
        assert!(metrics.market_value_adjustment.is_finite());
        assert!(metrics.cap_rate.unwrap().is_finite());
        assert!(metrics.cash_on_cash_return.unwrap().is_finite());
        assert!(metrics.roi.unwrap().is_finite());

        let json = serde_json::to_value(&metrics).unwrap();
        for field in ["taxBurden", "priceToAreaMedian", "capRate", "cashOnCashReturn", "roi"] {
            assert!(json[field].is_number(), "{field} should serialize as a number");
        }
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = ValuationSettings {
            market_condition: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            ValuationEngine::new(settings),
            Err(AnalyticsError::InvalidSettings(_))
        ));
    }
}
