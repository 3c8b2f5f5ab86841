use serde::{Deserialize, Serialize};

use ambumed_core::{AggregateRoot, DomainError, DomainResult, Entity, generate_entry_id};

use crate::inventory::InventoryEntry;
use crate::order::OrderEntry;

/// Aggregate root: Ambulance.
///
/// Owns its inventory and order entries by value. The whole document is the
/// unit of read-modify-write; entries never exist outside an ambulance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ambulance {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    room_number: String,
    #[serde(default)]
    pub(crate) medicine_inventory: Vec<InventoryEntry>,
    #[serde(default)]
    pub(crate) medicine_orders: Vec<OrderEntry>,
}

/// Request to register a new ambulance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAmbulance {
    pub id: Option<String>,
    pub name: String,
    pub room_number: String,
}

impl Ambulance {
    /// A fresh ambulance with empty inventory and no orders.
    pub fn new(new: NewAmbulance) -> DomainResult<Self> {
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("ambulance name is required"));
        }

        Ok(Self {
            id: generate_entry_id(new.id.as_deref()),
            name: new.name,
            room_number: new.room_number,
            medicine_inventory: Vec::new(),
            medicine_orders: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn room_number(&self) -> &str {
        &self.room_number
    }

    pub fn inventory(&self) -> &[InventoryEntry] {
        &self.medicine_inventory
    }

    pub fn orders(&self) -> &[OrderEntry] {
        &self.medicine_orders
    }
}

impl Entity for Ambulance {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl AggregateRoot for Ambulance {}
