//! The structured listing record.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// Structured yacht listing.
///
/// Every field is independently optional: `None` means the value was not
/// discoverable in the page text. Unknown keys are ignored on input.
/// The doc comments on fields become schema descriptions for the
/// extraction backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StructuredListing {
    /// Name of the yacht
    pub yacht_name: Option<String>,
    /// Builder or brand
    pub brand: Option<String>,
    /// Model designation
    pub model: Option<String>,
    /// Asking price as a plain number, without currency symbol or separators
    pub price: Option<f64>,
    /// ISO 4217 three-letter currency code of the price
    #[serde(rename = "currency_three_letter_shortcut")]
    pub currency_code: Option<String>,
    /// Build year
    pub year: Option<u16>,
    /// Length overall
    pub length: Option<String>,
    pub length_measurement_unit: Option<String>,
    /// Beam (width)
    pub beam: Option<String>,
    pub beam_measurement_unit: Option<String>,
    /// Draft (depth below waterline)
    pub draft: Option<String>,
    pub draft_measurement_unit: Option<String>,
    /// Number of berths
    pub num_berths: Option<u32>,
    /// Number of heads (toilets)
    pub num_heads: Option<u32>,
    /// Hull material, e.g. GRP, steel, aluminium
    pub hull_material: Option<String>,
    /// Number of engines
    pub engines: Option<u32>,
    /// Engine make/model or kind, e.g. inboard diesel
    pub engine_type: Option<String>,
    pub fuel_type: Option<String>,
    pub water_tank_volume: Option<String>,
    pub water_tank_measurement_unit: Option<String>,
    pub fuel_tank_volume: Option<String>,
    pub fuel_tank_measurement_unit: Option<String>,
    /// Where the yacht is lying
    pub location: Option<String>,
    /// Equipment items, usually listed under a "Features" section
    pub equipment: Option<Vec<String>>,
}

impl StructuredListing {
    /// Reject values that type-check but cannot be right.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        if let Some(price) = self.price {
            if !price.is_finite() || price < 0.0 {
                return Err(ExtractionError::Invalid {
                    field: "price",
                    reason: format!("{} is not a non-negative amount", price),
                });
            }
        }
        Ok(())
    }

    /// Number of fields that carry a value.
    pub fn populated_fields(&self) -> usize {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.values().filter(|v| !v.is_null()).count(),
            _ => 0,
        }
    }
}
