use crate::error::ConfigError;
use core_types::PropertyType;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub valuation: ValuationSettings,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.valuation.validate()
    }
}

/// Settings for the REST surface.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// The socket address the web server binds to.
    pub addr: SocketAddr,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

/// Settings for the tracing subscriber installed by the binaries.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, used when `RUST_LOG` is not set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "proplens.log".to_string(),
        }
    }
}

/// One value per property class.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TypeTable {
    pub residential: f64,
    pub commercial: f64,
    pub industrial: f64,
    pub land: f64,
    pub unknown: f64,
}

impl TypeTable {
    pub const fn new(residential: f64, commercial: f64, industrial: f64, land: f64, unknown: f64) -> Self {
        Self { residential, commercial, industrial, land, unknown }
    }

    pub fn get(&self, property_type: PropertyType) -> f64 {
        match property_type {
            PropertyType::Residential => self.residential,
            PropertyType::Commercial => self.commercial,
            PropertyType::Industrial => self.industrial,
            PropertyType::Land => self.land,
            PropertyType::Unknown => self.unknown,
        }
    }

    fn all_finite(&self) -> bool {
        [self.residential, self.commercial, self.industrial, self.land, self.unknown]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Every tunable constant of the valuation model.
///
/// The defaults are the production model. Overriding them is meant for
/// what-if analysis, not for day-to-day operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValuationSettings {
    /// Pins the year ages are computed against. `None` uses the current UTC year.
    pub current_year: Option<i32>,
    /// Build year assumed when a record has none.
    pub default_year_built: i32,

    // Age depreciation: max(floor, 1 - age*linear - (age*quadratic)^2)
    pub depreciation_linear: f64,
    pub depreciation_quadratic: f64,
    pub depreciation_floor: f64,

    // Location: clamp(county income / baseline, min, max)
    pub income_baseline: f64,
    pub location_multiplier_min: f64,
    pub location_multiplier_max: f64,

    pub type_multipliers: TypeTable,
    /// Flat market backdrop applied to every estimate.
    pub market_condition: f64,

    /// Expected appreciation and the half-width of the noise band around it.
    pub base_appreciation: f64,
    pub appreciation_spread: f64,

    // Commercial income model
    pub rent_yield: f64,
    pub operating_expense_ratio: f64,
    pub down_payment_ratio: f64,

    pub national_median_price: f64,
    pub default_tax_rate: f64,
    pub maintenance_rate: f64,
    pub insurance_rate: f64,

    pub scoring: ScoringSettings,
    pub portfolio: PortfolioSettings,
    pub market: MarketSettings,
}

impl Default for ValuationSettings {
    fn default() -> Self {
        Self {
            current_year: None,
            default_year_built: 2000,
            depreciation_linear: 0.008,
            depreciation_quadratic: 0.001,
            depreciation_floor: 0.7,
            income_baseline: 65_000.0,
            location_multiplier_min: 0.8,
            location_multiplier_max: 1.5,
            type_multipliers: TypeTable::new(1.0, 1.2, 0.9, 0.7, 1.0),
            market_condition: 1.05,
            base_appreciation: 0.03,
            appreciation_spread: 0.075,
            rent_yield: 0.08,
            operating_expense_ratio: 0.35,
            down_payment_ratio: 0.25,
            national_median_price: 350_000.0,
            default_tax_rate: 0.012,
            maintenance_rate: 0.015,
            insurance_rate: 0.003,
            scoring: ScoringSettings::default(),
            portfolio: PortfolioSettings::default(),
            market: MarketSettings::default(),
        }
    }
}

impl ValuationSettings {
    /// Rejects settings that would make the model produce negative or undefined values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let constants = [
            ("depreciation_linear", self.depreciation_linear),
            ("depreciation_quadratic", self.depreciation_quadratic),
            ("depreciation_floor", self.depreciation_floor),
            ("income_baseline", self.income_baseline),
            ("location_multiplier_min", self.location_multiplier_min),
            ("location_multiplier_max", self.location_multiplier_max),
            ("market_condition", self.market_condition),
            ("base_appreciation", self.base_appreciation),
            ("appreciation_spread", self.appreciation_spread),
            ("rent_yield", self.rent_yield),
            ("operating_expense_ratio", self.operating_expense_ratio),
            ("down_payment_ratio", self.down_payment_ratio),
            ("national_median_price", self.national_median_price),
            ("default_tax_rate", self.default_tax_rate),
            ("maintenance_rate", self.maintenance_rate),
            ("insurance_rate", self.insurance_rate),
            ("portfolio.leverage_ratio", self.portfolio.leverage_ratio),
            ("portfolio.liquid_value_threshold", self.portfolio.liquid_value_threshold),
        ];
        if let Some((name, _)) = constants.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::ValidationError(format!("{name} must be finite")));
        }
        if !(self.depreciation_floor > 0.0 && self.depreciation_floor <= 1.0) {
            return Err(invalid("depreciation_floor must be in (0, 1]"));
        }
        if self.depreciation_linear < 0.0 || self.depreciation_quadratic < 0.0 {
            return Err(invalid("depreciation rates must not be negative"));
        }
        if !(self.income_baseline > 0.0) {
            return Err(invalid("income_baseline must be greater than 0"));
        }
        if !(self.location_multiplier_min > 0.0)
            || self.location_multiplier_min > self.location_multiplier_max
        {
            return Err(invalid(
                "location multiplier bounds must satisfy 0 < min <= max",
            ));
        }
        if !self.type_multipliers.all_finite()
            || PropertyType::KNOWN
                .iter()
                .chain(std::iter::once(&PropertyType::Unknown))
                .any(|t| self.type_multipliers.get(*t) < 0.0)
        {
            return Err(invalid("type_multipliers must be finite and not negative"));
        }
        if !(self.market_condition > 0.0) {
            return Err(invalid("market_condition must be greater than 0"));
        }
        if self.appreciation_spread < 0.0 {
            return Err(invalid("appreciation_spread must not be negative"));
        }
        if !(self.national_median_price > 0.0) {
            return Err(invalid("national_median_price must be greater than 0"));
        }
        if !(self.down_payment_ratio > 0.0) {
            return Err(invalid("down_payment_ratio must be greater than 0"));
        }
        self.scoring.validate()?;
        self.market.validate()
    }
}

/// Per-class adjustments used by the three scorers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    pub market_type_bonus: TypeTable,
    pub liquidity_type_bonus: TypeTable,
    pub risk_type_penalty: TypeTable,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            market_type_bonus: TypeTable::new(5.0, 10.0, 0.0, -5.0, 0.0),
            liquidity_type_bonus: TypeTable::new(20.0, 10.0, 5.0, 0.0, 0.0),
            risk_type_penalty: TypeTable::new(0.0, 10.0, 20.0, 25.0, 15.0),
        }
    }
}

impl ScoringSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.market_type_bonus.all_finite()
            && self.liquidity_type_bonus.all_finite()
            && self.risk_type_penalty.all_finite()
        {
            Ok(())
        } else {
            Err(invalid("scoring tables must be finite"))
        }
    }
}

/// Constants of the owner-portfolio analysis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortfolioSettings {
    /// Reported as-is; there is no debt data to derive it from.
    pub leverage_ratio: f64,
    /// Residential holdings below this value count as liquid.
    pub liquid_value_threshold: f64,
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        Self {
            leverage_ratio: 0.65,
            liquid_value_threshold: 500_000.0,
        }
    }
}

/// Constants of the market-slice analysis.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarketSettings {
    pub base_price_growth: f64,
    pub price_growth_spread: f64,
    pub days_on_market_min: f64,
    pub days_on_market_max: f64,
    /// Reported when there is no priced property to analyse.
    pub default_days_on_market: u32,
    pub bullish_threshold: f64,
    pub bearish_threshold: f64,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            base_price_growth: 0.05,
            price_growth_spread: 0.05,
            days_on_market_min: 60.0,
            days_on_market_max: 120.0,
            default_days_on_market: 90,
            bullish_threshold: 0.07,
            bearish_threshold: 0.02,
        }
    }
}

impl MarketSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        let constants = [
            self.base_price_growth,
            self.price_growth_spread,
            self.days_on_market_min,
            self.days_on_market_max,
            self.bullish_threshold,
            self.bearish_threshold,
        ];
        if !constants.iter().all(|v| v.is_finite()) {
            return Err(invalid("market settings must be finite"));
        }
        if self.price_growth_spread < 0.0 {
            return Err(invalid("price_growth_spread must not be negative"));
        }
        if self.days_on_market_min < 0.0 || self.days_on_market_min > self.days_on_market_max {
            return Err(invalid(
                "days on market bounds must satisfy 0 <= min <= max",
            ));
        }
        if self.bearish_threshold > self.bullish_threshold {
            return Err(invalid(
                "bearish_threshold must not exceed bullish_threshold",
            ));
        }
        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn type_table_lookup() {
        let table = ValuationSettings::default().type_multipliers;
        assert_eq!(table.get(PropertyType::Commercial), 1.2);
        assert_eq!(table.get(PropertyType::Land), 0.7);
        assert_eq!(table.get(PropertyType::Unknown), 1.0);
    }

    #[test]
    fn rejects_depreciation_floor_above_one() {
        let settings = ValuationSettings {
            depreciation_floor: 1.2,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn rejects_inverted_location_bounds() {
        let settings = ValuationSettings {
            location_multiplier_min: 2.0,
            location_multiplier_max: 1.0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_constants() {
        let settings = ValuationSettings {
            market_condition: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ValidationError(msg)) if msg.contains("market_condition")
        ));

        let settings = ValuationSettings {
            national_median_price: f64::NAN,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let settings = ValuationSettings {
            income_baseline: f64::INFINITY,
            ..Default::default()
        };
        assert!(settings.validate().is_err());

        let mut settings = ValuationSettings::default();
        settings.market.base_price_growth = f64::NAN;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_inverted_trend_thresholds() {
        let mut settings = ValuationSettings::default();
        settings.market.bearish_threshold = 0.1;
        assert!(settings.validate().is_err());
    }
}
