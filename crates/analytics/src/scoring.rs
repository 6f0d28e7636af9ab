use crate::stats::score;
use configuration::ScoringSettings;
use core_types::PropertyRecord;

/// How attractive the property's market is. Starts at 50.
pub fn score_market(property: &PropertyRecord, price_per_sq_ft: f64, tables: &ScoringSettings) -> u8 {
    let mut raw = 50.0;

    if let Some(population) = property.city_population() {
        raw += (population / 50_000.0).min(20.0);
    }
    if let Some(income) = property.median_income() {
        raw += ((income - 50_000.0) / 5_000.0).min(15.0);
    }
    // Cheaper than $150/sqft reads as upside, dearer as stretched.
    raw += ((150.0 - price_per_sq_ft) / 20.0).clamp(-10.0, 10.0);
    raw += tables.market_type_bonus.get(property.kind());

    score(raw, 0.0, 100.0)
}

/// How quickly the property could be sold. Starts at 50.
pub fn score_liquidity(property: &PropertyRecord, current_year: i32, tables: &ScoringSettings) -> u8 {
    let mut raw = 50.0;

    raw += tables.liquidity_type_bonus.get(property.kind());

    if let Some(sqft) = property.square_footage {
        raw += ((3_000.0 - sqft) / 500.0).clamp(-15.0, 15.0);
    }
    if let Some(year_built) = property.year_built {
        let age = f64::from(current_year) - f64::from(year_built);
        raw += ((30.0 - age) / 5.0).clamp(-10.0, 10.0);
    }
    if property.city_population().is_some_and(|p| p > 100_000.0) {
        raw += 15.0;
    }

    score(raw, 0.0, 100.0)
}

/// Overall holding risk. Starts at 30; lower is safer.
pub fn score_risk(property: &PropertyRecord, age: i32, market_score: u8, tables: &ScoringSettings) -> u8 {
    let mut raw = 30.0;

    raw += if age > 50 {
        15.0
    } else if age > 30 {
        10.0
    } else if age < 5 {
        5.0
    } else {
        0.0
    };

    raw += f64::from(100 - market_score.min(100)) * 0.3;
    raw += tables.risk_type_penalty.get(property.kind());

    // High-value holdings concentrate capital; the two bands stack.
    let value = property.base_value();
    if value > 1_000_000.0 {
        raw += 10.0;
    }
    if value > 5_000_000.0 {
        raw += 15.0;
    }

    score(raw, 0.0, 100.0)
}
