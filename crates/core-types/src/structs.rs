use crate::enums::PropertyType;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Demographic statistics for the city or county a property sits in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaStats {
    pub name: Option<String>,
    pub population: Option<f64>,
    pub median_income: Option<f64>,
}

/// A single property as it comes out of the property database.
///
/// Every field is optional. The analytics layer substitutes documented
/// defaults for anything missing instead of rejecting the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub address: Option<String>,
    pub property_type: Option<PropertyType>,
    pub square_footage: Option<f64>,
    pub year_built: Option<i32>,
    pub current_value: Option<f64>,
    pub assessed_value: Option<f64>,
    pub tax_amount: Option<f64>,
    pub city: Option<AreaStats>,
    pub county: Option<AreaStats>,
}

impl PropertyRecord {
    /// Parses a single record from a JSON object.
    pub fn from_json(value: &Value) -> Result<Self, CoreError> {
        if !value.is_object() {
            return Err(CoreError::InvalidInput(
                "property".to_string(),
                format!("expected an object, found {}", json_kind(value)),
            ));
        }
        serde_json::from_value(value.clone())
            .map_err(|e| CoreError::InvalidInput("property".to_string(), e.to_string()))
    }

    /// Parses a list of records. The root must be a JSON array of objects.
    pub fn list_from_json(value: &Value) -> Result<Vec<Self>, CoreError> {
        let items = value.as_array().ok_or_else(|| {
            CoreError::InvalidInput(
                "properties".to_string(),
                format!("expected an array, found {}", json_kind(value)),
            )
        })?;

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Self::from_json(item).map_err(|e| match e {
                    CoreError::InvalidInput(_, reason) => {
                        CoreError::InvalidInput(format!("properties[{index}]"), reason)
                    }
                })
            })
            .collect()
    }

    /// The class of the property, `Unknown` when absent.
    pub fn kind(&self) -> PropertyType {
        self.property_type.unwrap_or_default()
    }

    /// The value the valuation starts from: current value, then assessed value, then 0.
    pub fn base_value(&self) -> f64 {
        self.current_value
            .or(self.assessed_value)
            .unwrap_or(0.0)
            .max(0.0)
    }

    /// The recorded market value only, 0 when absent.
    pub fn market_value(&self) -> f64 {
        self.current_value.unwrap_or(0.0).max(0.0)
    }

    pub fn city_population(&self) -> Option<f64> {
        self.city.as_ref().and_then(|c| c.population)
    }

    pub fn city_name(&self) -> Option<&str> {
        self.city.as_ref().and_then(|c| c.name.as_deref())
    }

    pub fn county_median_income(&self) -> Option<f64> {
        self.county.as_ref().and_then(|c| c.median_income)
    }

    /// City median income, falling back to the county figure.
    pub fn median_income(&self) -> Option<f64> {
        self.city
            .as_ref()
            .and_then(|c| c.median_income)
            .or_else(|| self.county_median_income())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_partial_camel_case_records() {
        let record = PropertyRecord::from_json(&json!({
            "address": "12 Elm St",
            "propertyType": "commercial",
            "currentValue": 1200000,
            "yearBuilt": null,
            "city": { "name": "Austin", "population": 950000 },
            "ownerName": "ignored"
        }))
        .unwrap();

        assert_eq!(record.kind(), PropertyType::Commercial);
        assert_eq!(record.base_value(), 1_200_000.0);
        assert_eq!(record.year_built, None);
        assert_eq!(record.city_name(), Some("Austin"));
        assert_eq!(record.city_population(), Some(950_000.0));
        assert_eq!(record.median_income(), None);
    }

    #[test]
    fn base_value_falls_back_to_assessed_then_zero() {
        let assessed = PropertyRecord {
            assessed_value: Some(300_000.0),
            ..Default::default()
        };
        assert_eq!(assessed.base_value(), 300_000.0);
        assert_eq!(assessed.market_value(), 0.0);
        assert_eq!(PropertyRecord::default().base_value(), 0.0);
        assert_eq!(PropertyRecord::default().kind(), PropertyType::Unknown);
    }

    #[test]
    fn median_income_prefers_city() {
        let record = PropertyRecord {
            city: Some(AreaStats {
                median_income: Some(80_000.0),
                ..Default::default()
            }),
            county: Some(AreaStats {
                median_income: Some(60_000.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(record.median_income(), Some(80_000.0));
        assert_eq!(record.county_median_income(), Some(60_000.0));
    }

    #[test]
    fn non_array_root_is_invalid_input() {
        let err = PropertyRecord::list_from_json(&json!({ "currentValue": 1 })).unwrap_err();
        assert!(err.to_string().contains("expected an array"));
    }

    #[test]
    fn non_object_element_reports_its_index() {
        let err = PropertyRecord::list_from_json(&json!([{}, 42])).unwrap_err();
        assert!(err.to_string().contains("properties[1]"));
    }

    #[test]
    fn wrongly_typed_field_is_invalid_input() {
        let err = PropertyRecord::from_json(&json!({ "currentValue": "lots" }));
        assert!(matches!(err, Err(CoreError::InvalidInput(_, _))));
    }
}
