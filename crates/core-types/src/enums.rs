use serde::{Deserialize, Serialize};
use std::fmt;

/// The broad land-use class of a property.
///
/// Anything the upstream data calls something else (or leaves blank) maps to
/// `Unknown`, which every lookup table carries its own entry for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Residential,
    Commercial,
    Industrial,
    Land,
    #[default]
    #[serde(other)]
    Unknown,
}

impl PropertyType {
    /// All known classes, in display order.
    pub const KNOWN: [PropertyType; 4] = [
        PropertyType::Residential,
        PropertyType::Commercial,
        PropertyType::Industrial,
        PropertyType::Land,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Residential => "residential",
            PropertyType::Commercial => "commercial",
            PropertyType::Industrial => "industrial",
            PropertyType::Land => "land",
            PropertyType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
