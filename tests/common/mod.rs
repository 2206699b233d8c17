//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use equiptrack::{
    config::AppConfig,
    events::EventBus,
    models::{CreateEquipment, CreateStudent, EquipmentItem, Student},
    repository::Repository,
    services::Services,
    storage::MemoryStorage,
};

/// Fresh repository over in-memory storage.
pub fn repository() -> Repository {
    Repository::open(Arc::new(MemoryStorage::new())).expect("failed to open repository")
}

pub fn services(repository: &Repository, events: &EventBus) -> Services {
    Services::new(repository.clone(), events.clone(), &AppConfig::default())
}

/// Add a student whose barcode is their name, the way the station's
/// passes are printed.
pub fn add_student(repository: &Repository, name: &str) -> Student {
    repository
        .students_insert(
            CreateStudent {
                name: name.to_string(),
                barcode: name.to_string(),
                email: None,
                photo: None,
            },
            Utc::now(),
        )
        .expect("failed to add student")
}

pub fn add_equipment(repository: &Repository, equipment_type: &str, barcode: &str) -> EquipmentItem {
    repository
        .equipment_insert(
            CreateEquipment {
                equipment_type: equipment_type.to_string(),
                barcode: barcode.to_string(),
                description: None,
            },
            Utc::now(),
        )
        .expect("failed to add equipment")
}
