//! Checkout/check-in transaction model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether the equipment is still out or has been returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Out,
    In,
}

/// One checkout record.
///
/// Student and equipment display fields are denormalized copies taken at
/// checkout time; later roster/inventory edits do not rewrite them. Only a
/// barcode rename cascades, so the identifying fields keep pointing at the
/// renamed record. `status == Out` holds exactly when `checkin_time` is
/// unset. Records are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub student_name: String,
    pub student_barcode: String,
    pub equipment_type: String,
    pub equipment_barcode: String,
    pub equipment_description: String,
    pub checkout_time: DateTime<Utc>,
    pub expected_return_time: Option<DateTime<Utc>>,
    pub checkin_time: Option<DateTime<Utc>>,
    pub status: TransactionStatus,
    pub checkout_notes: String,
    pub checkin_notes: String,
}

impl Transaction {
    pub fn is_open(&self) -> bool {
        self.status == TransactionStatus::Out
    }

    /// Overdue: still out, an expected return is set, and `now` is past it.
    /// Recomputed at every call; never persisted.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open()
            && self
                .expected_return_time
                .map(|expected| now > expected)
                .unwrap_or(false)
    }

    /// Whole minutes since checkout, rounded.
    pub fn minutes_out(&self, now: DateTime<Utc>) -> i64 {
        (((now - self.checkout_time).num_seconds() as f64) / 60.0).round() as i64
    }

    /// Display label for the equipment side: "<type> - <description or barcode>".
    pub fn equipment_label(&self) -> String {
        let detail = if self.equipment_description.is_empty() {
            &self.equipment_barcode
        } else {
            &self.equipment_description
        };
        format!("{} - {}", self.equipment_type, detail)
    }

    /// Checkout and check-in notes joined for display.
    pub fn notes_display(&self) -> String {
        match (
            self.checkout_notes.is_empty(),
            self.checkin_notes.is_empty(),
        ) {
            (true, true) => String::new(),
            (false, true) => self.checkout_notes.clone(),
            (true, false) => self.checkin_notes.clone(),
            (false, false) => format!("{} | {}", self.checkout_notes, self.checkin_notes),
        }
    }
}

/// Elapsed-time label: minutes under an hour, rounded hours after that.
pub fn format_elapsed(minutes: i64) -> String {
    if minutes < 60 {
        format!("{} min", minutes)
    } else {
        format!("{} hrs", ((minutes as f64) / 60.0).round() as i64)
    }
}
