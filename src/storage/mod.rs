//! Persistence boundary: whole-document storage for the three collections.
//!
//! Each collection is saved as one JSON array document under a fixed key.
//! Saves are full-replace and independent of each other; there is no
//! cross-collection transaction, so a crash between two saves can leave
//! the documents mutually inconsistent.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

use crate::error::AppResult;

/// Fixed collection keys.
pub const STUDENTS: &str = "students";
pub const EQUIPMENT: &str = "equipment";
pub const TRANSACTIONS: &str = "transactions";

/// Whole-document storage adapter.
pub trait Storage: Send + Sync {
    /// Load the raw document for a collection; `None` when never saved.
    fn load(&self, collection: &str) -> AppResult<Option<String>>;

    /// Replace the whole document for a collection.
    fn save(&self, collection: &str, document: &str) -> AppResult<()>;
}
