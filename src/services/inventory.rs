//! Equipment inventory service

use chrono::{DateTime, Utc};
use validator::Validate;

use crate::{
    config::SeedGroup,
    error::{AppError, AppResult},
    events::{AppEvent, EventBus},
    models::{CreateEquipment, EquipmentItem, UpdateEquipment},
    repository::Repository,
};

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
    events: EventBus,
}

impl InventoryService {
    pub fn new(repository: Repository, events: EventBus) -> Self {
        Self { repository, events }
    }

    /// List all equipment
    pub fn list(&self) -> AppResult<Vec<EquipmentItem>> {
        self.repository.equipment_list()
    }

    /// Get an equipment item by barcode
    pub fn get(&self, barcode: &str) -> AppResult<EquipmentItem> {
        self.repository.equipment_get(barcode)
    }

    /// Case-insensitive substring search over type, barcode and description.
    pub fn search(&self, query: &str) -> AppResult<Vec<EquipmentItem>> {
        let needle = query.to_lowercase();
        Ok(self
            .repository
            .equipment_list()?
            .into_iter()
            .filter(|e| {
                e.equipment_type.to_lowercase().contains(&needle)
                    || e.barcode.to_lowercase().contains(&needle)
                    || e.description
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            })
            .collect())
    }

    /// Add a new equipment item
    pub fn create(&self, data: CreateEquipment, now: DateTime<Utc>) -> AppResult<EquipmentItem> {
        let data = normalize(data);
        data.validate()?;
        let item = self.repository.equipment_insert(data, now)?;
        self.events.emit(AppEvent::InventoryChanged);
        Ok(item)
    }

    /// Edit an equipment item. A barcode rename cascades through the ledger.
    pub fn update(&self, barcode: &str, update: UpdateEquipment) -> AppResult<EquipmentItem> {
        update.validate()?;
        let renamed = update.barcode.as_deref().is_some_and(|b| b != barcode);
        let item = self.repository.equipment_update(barcode, &update)?;
        self.events.emit(AppEvent::InventoryChanged);
        if renamed {
            self.events.emit(AppEvent::LedgerChanged);
        }
        Ok(item)
    }

    /// Remove an equipment item. Transaction history is preserved.
    pub fn delete(&self, barcode: &str) -> AppResult<()> {
        self.repository.equipment_delete(barcode)?;
        self.events.emit(AppEvent::InventoryChanged);
        Ok(())
    }

    /// Provision the configured default equipment sets ("<label> 1" ..
    /// "<label> <count>"), skipping barcodes already in the inventory.
    /// Returns how many items were added.
    pub fn seed_defaults(&self, groups: &[SeedGroup], now: DateTime<Utc>) -> AppResult<usize> {
        let mut added = 0;
        for group in groups {
            for i in 1..=group.count {
                let barcode = format!("{} {}", group.label, i);
                if self.repository.equipment_find(&barcode)?.is_some() {
                    continue;
                }
                self.repository.equipment_insert(
                    CreateEquipment {
                        equipment_type: group.equipment_type.clone(),
                        barcode: barcode.clone(),
                        description: Some(barcode),
                    },
                    now,
                )?;
                added += 1;
            }
        }
        if added > 0 {
            self.events.emit(AppEvent::InventoryChanged);
        }
        Ok(added)
    }

    /// CSV export of the inventory: `Type,Barcode,Description` with fields
    /// containing a comma, quote or newline double-quote-wrapped.
    pub fn export_csv(&self) -> AppResult<String> {
        let equipment = self.repository.equipment_list()?;
        if equipment.is_empty() {
            return Err(AppError::BadRequest("No equipment to export".into()));
        }

        let mut csv = String::from("Type,Barcode,Description\n");
        for item in &equipment {
            csv.push_str(&format!(
                "{},{},{}\n",
                escape_csv(&item.equipment_type),
                escape_csv(&item.barcode),
                escape_csv(item.description.as_deref().unwrap_or("")),
            ));
        }
        Ok(csv)
    }
}

fn normalize(mut data: CreateEquipment) -> CreateEquipment {
    data.equipment_type = data.equipment_type.trim().to_string();
    data.barcode = data.barcode.trim().to_string();
    data.description = data
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    data
}

fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        assert_eq!(escape_csv("Rode Mic 1"), "Rode Mic 1");
        assert_eq!(escape_csv(""), "");
    }

    #[test]
    fn commas_quotes_and_newlines_are_wrapped() {
        assert_eq!(escape_csv("mic, shotgun"), "\"mic, shotgun\"");
        assert_eq!(escape_csv("the \"good\" one"), "\"the \"\"good\"\" one\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");
    }
}
