//! Application services over the repository

pub mod checkouts;
pub mod inventory;
pub mod roster;
pub mod scan;
pub mod stats;

use crate::{config::AppConfig, events::EventBus, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub roster: roster::RosterService,
    pub inventory: inventory::InventoryService,
    pub checkouts: checkouts::CheckoutsService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository and event bus
    pub fn new(repository: Repository, events: EventBus, config: &AppConfig) -> Self {
        Self {
            roster: roster::RosterService::new(
                repository.clone(),
                events.clone(),
                config.checkout.photo_max_bytes,
            ),
            inventory: inventory::InventoryService::new(repository.clone(), events.clone()),
            checkouts: checkouts::CheckoutsService::new(repository.clone(), events),
            stats: stats::StatsService::new(repository),
        }
    }
}
