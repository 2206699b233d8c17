//! Data models for equiptrack

pub mod equipment;
pub mod import_report;
pub mod student;
pub mod transaction;

// Re-export commonly used types
pub use equipment::{CreateEquipment, EquipmentItem, UpdateEquipment};
pub use import_report::ImportReport;
pub use student::{CreateStudent, Student, UpdateStudent};
pub use transaction::{format_elapsed, Transaction, TransactionStatus};
