//! Roster bulk-import report

use serde::{Deserialize, Serialize};

/// Outcome of a bulk roster import. Entries whose barcode already exists
/// are skipped, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Students added by this import.
    pub added: usize,
    /// Entries skipped because the barcode was already on the roster.
    pub skipped: usize,
    /// Roster size after the import.
    pub total: usize,
}
