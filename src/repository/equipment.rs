//! Equipment inventory methods on Repository

use chrono::{DateTime, Utc};

use super::Repository;
use crate::{
    error::{AppError, AppResult},
    models::{CreateEquipment, EquipmentItem, UpdateEquipment},
};

impl Repository {
    /// List all equipment in inventory order.
    pub fn equipment_list(&self) -> AppResult<Vec<EquipmentItem>> {
        let data = self.read()?;
        Ok(data.equipment.values().cloned().collect())
    }

    /// Find equipment by exact barcode.
    pub fn equipment_find(&self, barcode: &str) -> AppResult<Option<EquipmentItem>> {
        let data = self.read()?;
        Ok(data.equipment.get(barcode).cloned())
    }

    /// Get equipment by barcode
    pub fn equipment_get(&self, barcode: &str) -> AppResult<EquipmentItem> {
        self.equipment_find(barcode)?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", barcode)))
    }

    /// Add a new equipment item. Fails on a duplicate barcode.
    pub fn equipment_insert(
        &self,
        data: CreateEquipment,
        now: DateTime<Utc>,
    ) -> AppResult<EquipmentItem> {
        let mut state = self.write()?;
        if state.equipment.contains_key(&data.barcode) {
            return Err(AppError::Conflict(
                "Equipment with this barcode already exists".into(),
            ));
        }

        let item = EquipmentItem {
            equipment_type: data.equipment_type,
            barcode: data.barcode,
            description: data.description,
            added_date: now,
        };
        state.equipment.insert(item.barcode.clone(), item.clone());
        self.save_equipment(&state)?;
        Ok(item)
    }

    /// Edit an equipment item in place. A barcode rename cascades through
    /// the ledger; denormalized fields on historical transactions keep
    /// their point-in-time values.
    pub fn equipment_update(
        &self,
        barcode: &str,
        update: &UpdateEquipment,
    ) -> AppResult<EquipmentItem> {
        let mut state = self.write()?;
        let index = state
            .equipment
            .get_index_of(barcode)
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", barcode)))?;

        let new_barcode = update.barcode.as_deref().unwrap_or(barcode);
        let renamed = new_barcode != barcode;
        if renamed && state.equipment.contains_key(new_barcode) {
            return Err(AppError::Conflict(
                "Equipment with this barcode already exists".into(),
            ));
        }

        let mut item = state.equipment[index].clone();
        if let Some(equipment_type) = &update.equipment_type {
            item.equipment_type = equipment_type.clone();
        }
        item.barcode = new_barcode.to_string();
        if let Some(description) = &update.description {
            item.description = Some(description.clone());
        }

        if renamed {
            state.equipment.shift_remove_index(index);
            state
                .equipment
                .shift_insert(index, item.barcode.clone(), item.clone());
            let rewritten =
                super::transactions::cascade_equipment_barcode(&mut state, barcode, new_barcode);
            self.save_equipment(&state)?;
            if rewritten > 0 {
                self.save_transactions(&state)?;
            }
        } else {
            state.equipment[index] = item.clone();
            self.save_equipment(&state)?;
        }
        Ok(item)
    }

    /// Remove an equipment item. Transaction history is untouched.
    pub fn equipment_delete(&self, barcode: &str) -> AppResult<()> {
        let mut state = self.write()?;
        if state.equipment.shift_remove(barcode).is_none() {
            return Err(AppError::NotFound(format!(
                "Equipment {} not found",
                barcode
            )));
        }
        self.save_equipment(&state)?;
        Ok(())
    }
}
