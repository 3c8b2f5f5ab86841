use serde::{Deserialize, Serialize};

use ambumed_core::{DomainError, DomainResult, Entity, ValueObject};

/// Catalog id of the status every new order starts in.
pub const INITIAL_STATUS_ID: u32 = 1;

/// Status value that triggers delivery reconciliation into inventory.
pub const DELIVERED: &str = "Delivered";

/// Order status: a catalog document, and the snapshot embedded in orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    pub id: u32,
    pub value: String,
    /// Ids of the statuses reachable from this one. Empty means terminal.
    #[serde(default, alias = "ValidTransitions")]
    pub valid_transitions: Vec<u32>,
}

impl Status {
    pub fn new(id: u32, value: impl Into<String>, valid_transitions: Vec<u32>) -> Self {
        Self {
            id,
            value: value.into(),
            valid_transitions,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions.is_empty()
    }

    pub fn allows(&self, target: u32) -> bool {
        self.valid_transitions.contains(&target)
    }

    pub fn is_delivered(&self) -> bool {
        self.value == DELIVERED
    }

    /// Reject a transition to `target` unless it is an outgoing edge.
    pub fn ensure_transition(&self, target: u32) -> DomainResult<()> {
        if self.allows(target) {
            return Ok(());
        }
        if self.is_terminal() {
            return Err(DomainError::validation(format!(
                "order is in terminal status '{}', no further transitions allowed",
                self.value
            )));
        }
        Err(DomainError::validation(format!(
            "changed status {target} is not valid for current order state '{}'",
            self.value
        )))
    }
}

impl Entity for Status {
    type Id = u32;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl ValueObject for Status {}

/// The order lifecycle the service ships with.
///
/// ```text
/// To_ship(1) -> Shipped(2) -> Delivered(3)
///     \            \
///      +------------+-> Canceled(4)
/// ```
pub fn default_catalog() -> Vec<Status> {
    vec![
        Status::new(1, "To_ship", vec![2, 4]),
        Status::new(2, "Shipped", vec![3, 4]),
        Status::new(3, DELIVERED, vec![]),
        Status::new(4, "Canceled", vec![]),
    ]
}
