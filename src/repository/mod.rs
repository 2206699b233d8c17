//! Repository owning the three collections behind accessor methods.
//!
//! The roster and inventory are insertion-ordered maps keyed by barcode;
//! the ledger is an append-ordered list. Every mutation writes the touched
//! collection back through the storage adapter as a whole document.

pub mod equipment;
pub mod students;
pub mod transactions;

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::{EquipmentItem, Student, Transaction},
    storage::{self, Storage},
};

/// The three collections, mirrored to storage after each mutation.
#[derive(Default)]
pub(crate) struct DataSet {
    pub students: IndexMap<String, Student>,
    pub equipment: IndexMap<String, EquipmentItem>,
    pub transactions: Vec<Transaction>,
}

/// Main repository struct holding the in-memory state and its storage adapter
#[derive(Clone)]
pub struct Repository {
    state: Arc<RwLock<DataSet>>,
    storage: Arc<dyn Storage>,
    ids: Arc<snowflaked::sync::Generator>,
}

impl Repository {
    /// Load all three collections from the given storage adapter.
    pub fn open(storage: Arc<dyn Storage>) -> AppResult<Self> {
        let students: Vec<Student> = load_collection(storage.as_ref(), storage::STUDENTS)?;
        let equipment: Vec<EquipmentItem> = load_collection(storage.as_ref(), storage::EQUIPMENT)?;
        let transactions: Vec<Transaction> =
            load_collection(storage.as_ref(), storage::TRANSACTIONS)?;

        let dataset = DataSet {
            students: students
                .into_iter()
                .map(|s| (s.barcode.clone(), s))
                .collect(),
            equipment: equipment
                .into_iter()
                .map(|e| (e.barcode.clone(), e))
                .collect(),
            transactions,
        };

        Ok(Self {
            state: Arc::new(RwLock::new(dataset)),
            storage,
            ids: Arc::new(snowflaked::sync::Generator::new(0)),
        })
    }

    pub(crate) fn read(&self) -> AppResult<RwLockReadGuard<'_, DataSet>> {
        self.state
            .read()
            .map_err(|_| AppError::Internal("repository lock poisoned".into()))
    }

    pub(crate) fn write(&self) -> AppResult<RwLockWriteGuard<'_, DataSet>> {
        self.state
            .write()
            .map_err(|_| AppError::Internal("repository lock poisoned".into()))
    }

    /// Fresh ledger identifier (time-ordered snowflake).
    pub(crate) fn next_id(&self) -> i64 {
        self.ids.generate()
    }

    /// Full-replace save of the student collection.
    pub(crate) fn save_students(&self, data: &DataSet) -> AppResult<()> {
        let document = serde_json::to_string_pretty(&data.students.values().collect::<Vec<_>>())?;
        self.storage.save(storage::STUDENTS, &document)
    }

    /// Full-replace save of the equipment collection.
    pub(crate) fn save_equipment(&self, data: &DataSet) -> AppResult<()> {
        let document = serde_json::to_string_pretty(&data.equipment.values().collect::<Vec<_>>())?;
        self.storage.save(storage::EQUIPMENT, &document)
    }

    /// Full-replace save of the transaction ledger.
    pub(crate) fn save_transactions(&self, data: &DataSet) -> AppResult<()> {
        let document = serde_json::to_string_pretty(&data.transactions)?;
        self.storage.save(storage::TRANSACTIONS, &document)
    }
}

fn load_collection<T: DeserializeOwned>(storage: &dyn Storage, name: &str) -> AppResult<Vec<T>> {
    match storage.load(name)? {
        Some(document) => Ok(serde_json::from_str(&document)?),
        None => Ok(Vec::new()),
    }
}
