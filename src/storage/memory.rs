//! In-memory storage adapter for tests and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Mutex;

use super::Storage;
use crate::error::{AppError, AppResult};

#[derive(Default)]
pub struct MemoryStorage {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, collection: &str) -> AppResult<Option<String>> {
        let documents = self
            .documents
            .lock()
            .map_err(|_| AppError::Internal("storage lock poisoned".into()))?;
        Ok(documents.get(collection).cloned())
    }

    fn save(&self, collection: &str, document: &str) -> AppResult<()> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| AppError::Internal("storage lock poisoned".into()))?;
        documents.insert(collection.to_string(), document.to_string());
        Ok(())
    }
}
