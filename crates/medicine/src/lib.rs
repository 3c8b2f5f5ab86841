//! Medicine domain module (ambulance inventories and medicine orders).
//!
//! This crate contains business rules for the ambulance aggregate, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod ambulance;
pub mod inventory;
pub mod order;
pub mod status;

pub use ambulance::{Ambulance, NewAmbulance};
pub use inventory::{InventoryEntry, InventoryPatch, InventoryUpdate, NewInventoryEntry};
pub use order::{NewOrder, OrderEntry, OrderPatch, StatusPatch};
pub use status::{DELIVERED, INITIAL_STATUS_ID, Status, default_catalog};
