//! Medicine orders and their status lifecycle.
//!
//! States are catalog [`Status`] entries; an edge `from -> to` exists iff
//! `to.id` is listed in `from.valid_transitions`. Orders start in the catalog's
//! initial status and embed a *copy* of their current status. Reaching a status
//! whose value is `Delivered` folds the order into the ambulance inventory.

use serde::{Deserialize, Serialize};

use ambumed_core::{DomainError, DomainResult, Entity, generate_entry_id, position_by_id};

use crate::ambulance::Ambulance;
use crate::inventory::InventoryEntry;
use crate::status::Status;

/// Medicine order placed by an ambulance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntry {
    pub id: String,
    pub medicine_id: String,
    #[serde(default)]
    pub name: String,
    pub count: u32,
    pub status: Status,
}

impl Entity for OrderEntry {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl From<&OrderEntry> for InventoryEntry {
    fn from(order: &OrderEntry) -> Self {
        InventoryEntry {
            id: order.id.clone(),
            medicine_id: order.medicine_id.clone(),
            name: order.name.clone(),
            count: order.count,
        }
    }
}

/// Request: place a new order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewOrder {
    pub id: Option<String>,
    pub medicine_id: String,
    pub name: String,
    pub count: u32,
}

/// Status part of an order update. Only `id` may be supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusPatch {
    pub id: Option<u32>,
    pub value: Option<String>,
    pub valid_transitions: Option<Vec<u32>>,
}

/// Request: partial update of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderPatch {
    pub id: Option<String>,
    pub medicine_id: Option<String>,
    pub name: Option<String>,
    pub count: Option<u32>,
    pub status: Option<StatusPatch>,
}

impl OrderPatch {
    /// Target status id, if the patch asks for a transition.
    pub fn requested_status(&self) -> Option<u32> {
        self.status
            .as_ref()
            .and_then(|s| s.id)
            .filter(|id| *id != 0)
    }

    /// Reject edits of identity fields and of catalog-controlled status content.
    pub fn ensure_allowed(&self) -> DomainResult<()> {
        if self.id.as_deref().is_some_and(|v| !v.is_empty()) {
            return Err(DomainError::validation("cannot update id of existing order"));
        }
        if self.medicine_id.as_deref().is_some_and(|v| !v.is_empty()) {
            return Err(DomainError::validation(
                "cannot update medicine id of existing order",
            ));
        }
        if let Some(status) = &self.status {
            if status.value.is_some() || status.valid_transitions.is_some() {
                return Err(DomainError::validation(
                    "can only update status id to change state",
                ));
            }
        }
        Ok(())
    }
}

impl Ambulance {
    pub fn order(&self, order_id: &str) -> DomainResult<&OrderEntry> {
        self.medicine_orders
            .iter()
            .find(|o| o.id == order_id)
            .ok_or_else(|| DomainError::not_found(format!("order entry '{order_id}'")))
    }

    /// Place a new order in `initial` status.
    ///
    /// At most one order per id and one per medicine may exist at a time.
    pub fn place_order(&mut self, new: NewOrder, initial: Status) -> DomainResult<OrderEntry> {
        if new.medicine_id.trim().is_empty() {
            return Err(DomainError::validation("medicine id is required"));
        }
        if new.count == 0 {
            return Err(DomainError::validation("count must be positive"));
        }

        let order = OrderEntry {
            id: generate_entry_id(new.id.as_deref()),
            medicine_id: new.medicine_id,
            name: new.name,
            count: new.count,
            status: initial,
        };

        if self
            .medicine_orders
            .iter()
            .any(|o| o.id == order.id || o.medicine_id == order.medicine_id)
        {
            return Err(DomainError::conflict("order entry already exists"));
        }

        self.medicine_orders.push(order.clone());
        Ok(order)
    }

    /// Apply a partial update, including an optional status transition.
    ///
    /// `resolve_status` looks up the target catalog entry; it is only called
    /// once the transition has been validated against the embedded status. The
    /// aggregate is left untouched when any step fails.
    pub fn update_order<F, E>(
        &mut self,
        order_id: &str,
        patch: OrderPatch,
        resolve_status: F,
    ) -> Result<OrderEntry, E>
    where
        F: FnOnce(u32) -> Result<Status, E>,
        E: From<DomainError>,
    {
        let idx = position_by_id(&self.medicine_orders, &order_id.to_string())
            .ok_or_else(|| DomainError::not_found(format!("order entry '{order_id}'")))?;
        patch.ensure_allowed()?;

        let mut order = self.medicine_orders[idx].clone();
        if let Some(count) = patch.count.filter(|c| *c > 0) {
            order.count = count;
        }
        if let Some(name) = patch.name.as_deref().filter(|n| !n.is_empty()) {
            order.name = name.to_string();
        }

        if let Some(target) = patch.requested_status() {
            order.status.ensure_transition(target)?;
            order.status = resolve_status(target)?;
            if order.status.is_delivered() {
                self.reconcile_delivery(&order)?;
            }
        }

        self.medicine_orders[idx] = order.clone();
        Ok(order)
    }

    pub fn remove_order(&mut self, order_id: &str) -> DomainResult<OrderEntry> {
        let idx = position_by_id(&self.medicine_orders, &order_id.to_string())
            .ok_or_else(|| DomainError::not_found(format!("order entry '{order_id}'")))?;
        Ok(self.medicine_orders.remove(idx))
    }

    /// Fold a delivered order into inventory.
    ///
    /// The matching entry (same id or same medicine) grows by the order count;
    /// without a match the order becomes a new inventory entry.
    pub fn reconcile_delivery(&mut self, order: &OrderEntry) -> DomainResult<()> {
        let existing = self
            .medicine_inventory
            .iter_mut()
            .find(|e| e.id == order.id || e.medicine_id == order.medicine_id);

        match existing {
            Some(entry) => {
                entry.count = entry
                    .count
                    .checked_add(order.count)
                    .ok_or_else(|| DomainError::validation("inventory count overflow"))?;
            }
            None => self.medicine_inventory.push(InventoryEntry::from(order)),
        }
        Ok(())
    }
}
