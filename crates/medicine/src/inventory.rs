use serde::{Deserialize, Serialize};

use ambumed_core::{DomainError, DomainResult, Entity, generate_entry_id, position_by_id};

use crate::ambulance::Ambulance;

/// Medicine stocked in an ambulance.
///
/// `count` is never zero for a stored entry: zeroing an entry removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub id: String,
    pub medicine_id: String,
    #[serde(default)]
    pub name: String,
    pub count: u32,
}

impl Entity for InventoryEntry {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Request: stock a new medicine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewInventoryEntry {
    pub id: Option<String>,
    pub medicine_id: String,
    pub name: String,
    pub count: u32,
}

/// Request: partial update of an inventory entry.
///
/// Absent or blank fields are left untouched. `count: Some(0)` removes the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryPatch {
    pub id: Option<String>,
    pub medicine_id: Option<String>,
    pub name: Option<String>,
    pub count: Option<u32>,
}

/// Outcome of [`Ambulance::update_inventory_entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryUpdate {
    Updated(InventoryEntry),
    /// The count dropped to zero and the entry is gone.
    Removed,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

impl Ambulance {
    pub fn inventory_entry(&self, entry_id: &str) -> DomainResult<&InventoryEntry> {
        self.medicine_inventory
            .iter()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| DomainError::not_found(format!("inventory entry '{entry_id}'")))
    }

    pub fn add_inventory_entry(&mut self, new: NewInventoryEntry) -> DomainResult<InventoryEntry> {
        if new.medicine_id.trim().is_empty() {
            return Err(DomainError::validation("medicine id is required"));
        }
        if new.count == 0 {
            return Err(DomainError::validation("count must be positive"));
        }

        let entry = InventoryEntry {
            id: generate_entry_id(new.id.as_deref()),
            medicine_id: new.medicine_id,
            name: new.name,
            count: new.count,
        };

        if self
            .medicine_inventory
            .iter()
            .any(|e| e.id == entry.id || e.medicine_id == entry.medicine_id)
        {
            return Err(DomainError::conflict("inventory entry already exists"));
        }

        self.medicine_inventory.push(entry.clone());
        Ok(entry)
    }

    pub fn update_inventory_entry(
        &mut self,
        entry_id: &str,
        patch: InventoryPatch,
    ) -> DomainResult<InventoryUpdate> {
        let idx = position_by_id(&self.medicine_inventory, &entry_id.to_string())
            .ok_or_else(|| DomainError::not_found(format!("inventory entry '{entry_id}'")))?;

        if patch.count == Some(0) {
            self.medicine_inventory.remove(idx);
            return Ok(InventoryUpdate::Removed);
        }

        if let Some(new_id) = non_blank(&patch.id) {
            if self.inventory_entry_taken(idx, |e| e.id == new_id) {
                return Err(DomainError::conflict(format!(
                    "inventory entry '{new_id}' already exists"
                )));
            }
        }
        if let Some(medicine_id) = non_blank(&patch.medicine_id) {
            if self.inventory_entry_taken(idx, |e| e.medicine_id == medicine_id) {
                return Err(DomainError::conflict(format!(
                    "inventory entry for medicine '{medicine_id}' already exists"
                )));
            }
        }

        let entry = &mut self.medicine_inventory[idx];
        if let Some(count) = patch.count {
            entry.count = count;
        }
        if let Some(medicine_id) = non_blank(&patch.medicine_id) {
            entry.medicine_id = medicine_id.to_string();
        }
        if let Some(new_id) = non_blank(&patch.id) {
            entry.id = new_id.to_string();
        }
        if let Some(name) = non_blank(&patch.name) {
            entry.name = name.to_string();
        }

        Ok(InventoryUpdate::Updated(entry.clone()))
    }

    pub fn remove_inventory_entry(&mut self, entry_id: &str) -> DomainResult<InventoryEntry> {
        let idx = position_by_id(&self.medicine_inventory, &entry_id.to_string())
            .ok_or_else(|| DomainError::not_found(format!("inventory entry '{entry_id}'")))?;
        Ok(self.medicine_inventory.remove(idx))
    }

    /// Whether an entry other than the one at `skip` matches.
    fn inventory_entry_taken(&self, skip: usize, matches: impl Fn(&InventoryEntry) -> bool) -> bool {
        self.medicine_inventory
            .iter()
            .enumerate()
            .any(|(i, e)| i != skip && matches(e))
    }
}
