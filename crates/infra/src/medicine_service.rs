//! Application service: the ambulance, inventory, order and status operations
//! exposed by the API, composed from the updater, the catalog and the stores.

use std::sync::Arc;

use tracing::{info, instrument};

use ambumed_core::{DocumentId, Entity, Mutation};
use ambumed_medicine::{
    Ambulance, InventoryEntry, InventoryPatch, InventoryUpdate, NewAmbulance, NewInventoryEntry,
    NewOrder, OrderEntry, OrderPatch, Status,
};

use crate::ambulance_updater::{AggregateUpdater, UpdateError};
use crate::document_store::DocumentStore;
use crate::status_catalog::StatusCatalog;

pub type AmbulanceStore = Arc<dyn DocumentStore<Ambulance>>;
pub type StatusStore = Arc<dyn DocumentStore<Status>>;

#[derive(Clone)]
pub struct MedicineService {
    ambulances: AmbulanceStore,
    updater: AggregateUpdater<AmbulanceStore>,
    catalog: StatusCatalog<StatusStore>,
}

impl std::fmt::Debug for MedicineService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MedicineService")
            .field("ambulances", &self.ambulances.collection())
            .finish_non_exhaustive()
    }
}

impl MedicineService {
    pub fn new(ambulances: AmbulanceStore, statuses: StatusStore) -> Self {
        Self {
            updater: AggregateUpdater::new(ambulances.clone()),
            ambulances,
            catalog: StatusCatalog::new(statuses),
        }
    }

    // Ambulances

    #[instrument(skip(self, new), err)]
    pub async fn create_ambulance(&self, new: NewAmbulance) -> Result<Ambulance, UpdateError> {
        let ambulance = Ambulance::new(new)?;
        self.ambulances
            .create(&DocumentId::from(ambulance.id()), &ambulance)
            .await?;
        info!(ambulance_id = %ambulance.id(), "ambulance created");
        Ok(ambulance)
    }

    pub async fn ambulance(&self, ambulance_id: &str) -> Result<Ambulance, UpdateError> {
        Ok(self.ambulances.find(&DocumentId::from(ambulance_id)).await?)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_ambulance(&self, ambulance_id: &str) -> Result<(), UpdateError> {
        self.ambulances.delete(&DocumentId::from(ambulance_id)).await?;
        info!(ambulance_id, "ambulance deleted");
        Ok(())
    }

    // Inventory

    pub async fn inventory_entries(
        &self,
        ambulance_id: &str,
    ) -> Result<Vec<InventoryEntry>, UpdateError> {
        self.updater
            .apply(ambulance_id, |ambulance| {
                Ok::<_, UpdateError>(Mutation::read_only(ambulance.inventory().to_vec()))
            })
            .await
    }

    pub async fn inventory_entry(
        &self,
        ambulance_id: &str,
        entry_id: &str,
    ) -> Result<InventoryEntry, UpdateError> {
        self.updater
            .apply(ambulance_id, |ambulance| {
                let entry = ambulance.inventory_entry(entry_id)?.clone();
                Ok::<_, UpdateError>(Mutation::read_only(entry))
            })
            .await
    }

    pub async fn create_inventory_entry(
        &self,
        ambulance_id: &str,
        new: NewInventoryEntry,
    ) -> Result<InventoryEntry, UpdateError> {
        self.updater
            .apply(ambulance_id, |mut ambulance| {
                let entry = ambulance.add_inventory_entry(new)?;
                Ok::<_, UpdateError>(Mutation::changed(ambulance, entry))
            })
            .await
    }

    /// `Ok(None)` when the patch set the count to zero and the entry was removed.
    pub async fn update_inventory_entry(
        &self,
        ambulance_id: &str,
        entry_id: &str,
        patch: InventoryPatch,
    ) -> Result<Option<InventoryEntry>, UpdateError> {
        self.updater
            .apply(ambulance_id, |mut ambulance| {
                let reply = match ambulance.update_inventory_entry(entry_id, patch)? {
                    InventoryUpdate::Updated(entry) => Some(entry),
                    InventoryUpdate::Removed => None,
                };
                Ok::<_, UpdateError>(Mutation::changed(ambulance, reply))
            })
            .await
    }

    pub async fn delete_inventory_entry(
        &self,
        ambulance_id: &str,
        entry_id: &str,
    ) -> Result<(), UpdateError> {
        self.updater
            .apply(ambulance_id, |mut ambulance| {
                ambulance.remove_inventory_entry(entry_id)?;
                Ok::<_, UpdateError>(Mutation::changed(ambulance, ()))
            })
            .await
    }

    // Orders

    pub async fn orders(&self, ambulance_id: &str) -> Result<Vec<OrderEntry>, UpdateError> {
        self.updater
            .apply(ambulance_id, |ambulance| {
                Ok::<_, UpdateError>(Mutation::read_only(ambulance.orders().to_vec()))
            })
            .await
    }

    pub async fn order(&self, ambulance_id: &str, order_id: &str) -> Result<OrderEntry, UpdateError> {
        self.updater
            .apply(ambulance_id, |ambulance| {
                let order = ambulance.order(order_id)?.clone();
                Ok::<_, UpdateError>(Mutation::read_only(order))
            })
            .await
    }

    /// Place an order in the catalog's initial status.
    #[instrument(skip(self, new), fields(medicine_id = %new.medicine_id), err)]
    pub async fn create_order(
        &self,
        ambulance_id: &str,
        new: NewOrder,
    ) -> Result<OrderEntry, UpdateError> {
        // Looked up ahead of the cycle; a missing ambulance is still reported first.
        let initial = self.catalog.initial_status().await;

        self.updater
            .apply(ambulance_id, |mut ambulance| {
                let initial = initial?;
                let order = ambulance.place_order(new, initial)?;
                Ok::<_, UpdateError>(Mutation::changed(ambulance, order))
            })
            .await
    }

    /// Update an order; a requested status change is validated against the
    /// order's embedded status before the catalog entry is consulted.
    #[instrument(skip(self, patch), err)]
    pub async fn update_order(
        &self,
        ambulance_id: &str,
        order_id: &str,
        patch: OrderPatch,
    ) -> Result<OrderEntry, UpdateError> {
        // A patch the domain rejects never reaches the resolver, so skip the lookup.
        let target = match patch.requested_status() {
            Some(id) if patch.ensure_allowed().is_ok() => {
                Some(self.catalog.status_by_id(id).await)
            }
            _ => None,
        };

        self.updater
            .apply(ambulance_id, |mut ambulance| {
                let order = ambulance.update_order(
                    order_id,
                    patch,
                    |id| -> Result<Status, UpdateError> {
                        match target {
                            Some(found) => Ok(found?),
                            None => Err(UpdateError::Internal(format!(
                                "status {id} was not prefetched"
                            ))),
                        }
                    },
                )?;
                Ok::<_, UpdateError>(Mutation::changed(ambulance, order))
            })
            .await
    }

    pub async fn delete_order(&self, ambulance_id: &str, order_id: &str) -> Result<(), UpdateError> {
        self.updater
            .apply(ambulance_id, |mut ambulance| {
                ambulance.remove_order(order_id)?;
                Ok::<_, UpdateError>(Mutation::changed(ambulance, ()))
            })
            .await
    }

    // Statuses

    pub async fn initial_status(&self) -> Result<Status, UpdateError> {
        Ok(self.catalog.initial_status().await?)
    }

    pub async fn status(&self, status_id: u32) -> Result<Status, UpdateError> {
        Ok(self.catalog.status_by_id(status_id).await?)
    }

    pub async fn statuses(&self) -> Result<Vec<Status>, UpdateError> {
        Ok(self.catalog.all_statuses().await?)
    }

    /// Release the backend connection. Both stores share one connection
    /// manager, so closing it once is enough.
    pub async fn disconnect(&self) -> Result<(), UpdateError> {
        self.ambulances.disconnect().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::InMemoryDocumentStore;
    use crate::seed::ensure_default_catalog;
    use crate::error::StoreError;
    use ambumed_medicine::StatusPatch;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn service() -> MedicineService {
        let statuses = Arc::new(InMemoryDocumentStore::<Status>::new("status"));
        ensure_default_catalog(&statuses).await.unwrap();
        let service = MedicineService::new(
            Arc::new(InMemoryDocumentStore::<Ambulance>::new("ambulance")),
            statuses,
        );
        service
            .create_ambulance(NewAmbulance {
                id: Some("bratislava-nemocnica".to_string()),
                name: "Nemocnica Bratislava".to_string(),
                room_number: "356 - 1.poschodie".to_string(),
            })
            .await
            .unwrap();
        service
    }

    const AMB: &str = "bratislava-nemocnica";

    fn order(id: &str, medicine_id: &str, count: u32) -> NewOrder {
        NewOrder {
            id: Some(id.to_string()),
            medicine_id: medicine_id.to_string(),
            name: "Paralen".to_string(),
            count,
        }
    }

    fn move_to(status_id: u32) -> OrderPatch {
        OrderPatch {
            status: Some(StatusPatch {
                id: Some(status_id),
                ..StatusPatch::default()
            }),
            ..OrderPatch::default()
        }
    }

    #[tokio::test]
    async fn duplicate_ambulance_is_conflict() {
        let service = service().await;
        let err = service
            .create_ambulance(NewAmbulance {
                id: Some(AMB.to_string()),
                name: "Again".to_string(),
                room_number: String::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UpdateError::Conflict(_)));
    }

    #[tokio::test]
    async fn order_lifecycle_end_to_end() {
        let service = service().await;

        let created = service.create_order(AMB, order("o1", "m1", 20)).await.unwrap();
        assert_eq!(created.status.id, 1);

        let shipped = service.update_order(AMB, "o1", move_to(2)).await.unwrap();
        assert_eq!(shipped.status.value, "Shipped");
        assert_eq!(service.order(AMB, "o1").await.unwrap().status.id, 2);

        service.create_order(AMB, order("o2", "m2", 5)).await.unwrap();
        let err = service.update_order(AMB, "o2", move_to(3)).await.unwrap_err();
        assert!(matches!(err, UpdateError::Validation(_)));
        assert_eq!(service.order(AMB, "o2").await.unwrap().status.id, 1);
    }

    #[tokio::test]
    async fn delivery_is_folded_into_persisted_inventory() {
        let service = service().await;
        service
            .create_inventory_entry(
                AMB,
                NewInventoryEntry {
                    id: Some("e1".to_string()),
                    medicine_id: "m1".to_string(),
                    name: "Paralen".to_string(),
                    count: 10,
                },
            )
            .await
            .unwrap();
        service.create_order(AMB, order("o1", "m1", 5)).await.unwrap();

        service.update_order(AMB, "o1", move_to(2)).await.unwrap();
        let delivered = service.update_order(AMB, "o1", move_to(3)).await.unwrap();
        assert!(delivered.status.is_delivered());

        let inventory = service.inventory_entries(AMB).await.unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].count, 15);
    }

    #[tokio::test]
    async fn transition_is_validated_before_catalog_lookup() {
        let service = service().await;
        service.create_order(AMB, order("o1", "m1", 5)).await.unwrap();

        // 9 is neither allowed from To_ship nor present in the catalog.
        let err = service.update_order(AMB, "o1", move_to(9)).await.unwrap_err();
        assert!(matches!(err, UpdateError::Validation(_)));
    }

    /// Status store that counts lookups.
    struct CountingStatuses {
        inner: InMemoryDocumentStore<Status>,
        finds: AtomicUsize,
    }

    #[async_trait]
    impl DocumentStore<Status> for CountingStatuses {
        fn collection(&self) -> &str {
            self.inner.collection()
        }

        async fn create(&self, id: &DocumentId, document: &Status) -> Result<(), StoreError> {
            self.inner.create(id, document).await
        }

        async fn find(&self, id: &DocumentId) -> Result<Status, StoreError> {
            self.finds.fetch_add(1, Ordering::SeqCst);
            self.inner.find(id).await
        }

        async fn find_all(&self) -> Result<Vec<Status>, StoreError> {
            self.inner.find_all().await
        }

        async fn update(&self, id: &DocumentId, document: &Status) -> Result<(), StoreError> {
            self.inner.update(id, document).await
        }

        async fn delete(&self, id: &DocumentId) -> Result<(), StoreError> {
            self.inner.delete(id).await
        }

        async fn disconnect(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn rejected_patch_skips_catalog_lookup() {
        let statuses = Arc::new(CountingStatuses {
            inner: InMemoryDocumentStore::new("status"),
            finds: AtomicUsize::new(0),
        });
        ensure_default_catalog(&statuses).await.unwrap();
        let service = MedicineService::new(
            Arc::new(InMemoryDocumentStore::<Ambulance>::new("ambulance")),
            statuses.clone(),
        );
        service
            .create_ambulance(NewAmbulance {
                id: Some(AMB.to_string()),
                name: "Test".to_string(),
                room_number: String::new(),
            })
            .await
            .unwrap();
        service.create_order(AMB, order("o1", "m1", 5)).await.unwrap();
        let lookups = statuses.finds.load(Ordering::SeqCst);

        let patch = OrderPatch {
            medicine_id: Some("m2".to_string()),
            ..move_to(2)
        };
        let err = service.update_order(AMB, "o1", patch).await.unwrap_err();

        assert!(matches!(err, UpdateError::Validation(_)));
        assert_eq!(statuses.finds.load(Ordering::SeqCst), lookups);

        service.update_order(AMB, "o1", move_to(2)).await.unwrap();
        assert_eq!(statuses.finds.load(Ordering::SeqCst), lookups + 1);
    }

    #[tokio::test]
    async fn rejected_patch_on_missing_ambulance_is_not_found() {
        let service = service().await;
        let patch = OrderPatch {
            medicine_id: Some("m2".to_string()),
            ..move_to(2)
        };
        let err = service.update_order("nope", "o1", patch).await.unwrap_err();
        assert!(matches!(err, UpdateError::NotFound(_)));
    }

    #[tokio::test]
    async fn missing_ambulance_is_reported_before_missing_catalog() {
        let service = MedicineService::new(
            Arc::new(InMemoryDocumentStore::<Ambulance>::new("ambulance")),
            Arc::new(InMemoryDocumentStore::<Status>::new("status")),
        );
        let err = service.create_order("nope", order("o1", "m1", 1)).await.unwrap_err();
        assert_eq!(err, UpdateError::NotFound("ambulance 'nope'".to_string()));
    }

    #[tokio::test]
    async fn zero_count_removes_inventory_entry() {
        let service = service().await;
        service
            .create_inventory_entry(
                AMB,
                NewInventoryEntry {
                    id: Some("e1".to_string()),
                    medicine_id: "m1".to_string(),
                    name: "Paralen".to_string(),
                    count: 4,
                },
            )
            .await
            .unwrap();

        let removed = service
            .update_inventory_entry(
                AMB,
                "e1",
                InventoryPatch {
                    count: Some(0),
                    ..InventoryPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(removed.is_none());

        let err = service.inventory_entry(AMB, "e1").await.unwrap_err();
        assert!(matches!(err, UpdateError::NotFound(_)));
    }

    #[tokio::test]
    async fn deleted_order_is_gone() {
        let service = service().await;
        service.create_order(AMB, order("o1", "m1", 5)).await.unwrap();
        service.delete_order(AMB, "o1").await.unwrap();

        assert!(service.orders(AMB).await.unwrap().is_empty());
        assert!(matches!(
            service.delete_order(AMB, "o1").await.unwrap_err(),
            UpdateError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn statuses_come_from_the_catalog() {
        let service = service().await;
        assert_eq!(service.initial_status().await.unwrap().value, "To_ship");
        assert_eq!(service.status(4).await.unwrap().value, "Canceled");
        assert_eq!(service.statuses().await.unwrap().len(), 4);
    }
}
