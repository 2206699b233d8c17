//! Equipment inventory model and request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Equipment record, uniquely keyed by barcode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentItem {
    /// Free-text category (Microphone, Tripod, ...)
    #[serde(rename = "type")]
    pub equipment_type: String,
    pub barcode: String,
    pub description: Option<String>,
    pub added_date: DateTime<Utc>,
}

impl EquipmentItem {
    /// Display label: "<type> - <description or barcode>".
    pub fn label(&self) -> String {
        let detail = self
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.barcode);
        format!("{} - {}", self.equipment_type, detail)
    }
}

/// Create equipment request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEquipment {
    #[validate(length(min = 1, message = "Type is required"))]
    pub equipment_type: String,
    #[validate(length(min = 1, message = "Barcode is required"))]
    pub barcode: String,
    pub description: Option<String>,
}

/// Update equipment request; unset fields are left unchanged.
/// A changed barcode cascades through the transaction ledger.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, message = "Type is required"))]
    pub equipment_type: Option<String>,
    #[validate(length(min = 1, message = "Barcode is required"))]
    pub barcode: Option<String>,
    pub description: Option<String>,
}
