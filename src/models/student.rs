//! Student roster model and request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Student record. The barcode is the unique key; the photo is an opaque
/// blob reference (data URL) stored exactly as uploaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    pub barcode: String,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub added_date: DateTime<Utc>,
}

/// Create student request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateStudent {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Barcode is required"))]
    pub barcode: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub photo: Option<String>,
}

/// Update student request; unset fields are left unchanged.
/// A changed barcode cascades through the transaction ledger.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateStudent {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Barcode is required"))]
    pub barcode: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub photo: Option<String>,
}
