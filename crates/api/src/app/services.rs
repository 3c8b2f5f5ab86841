//! Process configuration and storage wiring.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use ambumed_infra::{
    AMBULANCE_COLLECTION, ConnectionManager, DocumentStoreConfig, InMemoryDocumentStore,
    MedicineService, PgConnector, PostgresDocumentStore, STATUS_COLLECTION, seed,
};
use ambumed_medicine::{Ambulance, Status};

const DEFAULT_PORT: u16 = 8080;

/// Where documents are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process-local, lost on restart. The status catalog is always seeded.
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub environment: String,
    pub storage: StorageBackend,
    pub seed_catalog: bool,
    pub store: DocumentStoreConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: "development".to_string(),
            storage: StorageBackend::Postgres,
            seed_catalog: true,
            store: DocumentStoreConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = match lookup("MEDICINE_API_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!(value = %raw, "invalid MEDICINE_API_PORT; using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => defaults.port,
        };

        let storage = match lookup("MEDICINE_API_STORAGE").as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("memory") => StorageBackend::Memory,
            Some(v) if v.is_empty() || v.eq_ignore_ascii_case("postgres") => StorageBackend::Postgres,
            Some(v) => {
                warn!(value = %v, "unknown MEDICINE_API_STORAGE; using postgres");
                StorageBackend::Postgres
            }
            None => defaults.storage,
        };

        let seed_catalog = match lookup("MEDICINE_API_SEED_CATALOG").as_deref().map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => false,
            _ => defaults.seed_catalog,
        };

        Self {
            port,
            environment: lookup("MEDICINE_API_ENVIRONMENT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.environment),
            storage,
            seed_catalog,
            store: DocumentStoreConfig::from_lookup(&lookup),
        }
    }
}

/// Wire the stores for the configured backend and seed the status catalog.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<MedicineService> {
    match config.storage {
        StorageBackend::Memory => {
            let ambulances = Arc::new(InMemoryDocumentStore::<Ambulance>::new(AMBULANCE_COLLECTION));
            let statuses = Arc::new(InMemoryDocumentStore::<Status>::new(STATUS_COLLECTION));
            seed::ensure_default_catalog(&statuses)
                .await
                .context("seeding in-memory status catalog")?;

            info!("using in-memory document stores");
            Ok(MedicineService::new(ambulances, statuses))
        }
        StorageBackend::Postgres => {
            let store = &config.store;
            let manager = Arc::new(ConnectionManager::new(
                PgConnector::new(store.clone()),
                store.timeout,
            ));
            let ambulances = Arc::new(PostgresDocumentStore::<Ambulance>::new(
                manager.clone(),
                AMBULANCE_COLLECTION,
            ));
            let statuses = Arc::new(PostgresDocumentStore::<Status>::new(manager, STATUS_COLLECTION));

            if config.seed_catalog {
                seed::ensure_default_catalog(&statuses)
                    .await
                    .with_context(|| format!("seeding status catalog at {}", store.redacted_url()))?;
            }

            info!(database = %store.redacted_url(), "using postgres document stores");
            Ok(MedicineService::new(ambulances, statuses))
        }
    }
}
