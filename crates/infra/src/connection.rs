//! Lazily established, process-shared backend connection.
//!
//! ## Acquisition
//!
//! ```text
//! connect()
//!   ↓
//! 1. lock-free load of the published handle  ── hit ──→ return it
//!   ↓ miss
//! 2. take the connect lock, load again        ── hit ──→ return it
//!   ↓ miss
//! 3. connect (bounded by the timeout), publish, return
//! ```
//!
//! Steady-state callers never touch the lock. Racing first callers queue on the
//! lock and find the handle published by whoever got there first, so exactly
//! one connection is opened per manager.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::StoreError;

/// Opens and releases the underlying backend handle.
#[async_trait]
pub trait Connector: Send + Sync {
    type Handle: Send + Sync + 'static;

    async fn connect(&self) -> Result<Self::Handle, StoreError>;

    async fn close(&self, handle: Arc<Self::Handle>) -> Result<(), StoreError>;
}

/// Owner of the single shared connection handle.
///
/// Constructed once by process bootstrap and shared through `Arc` with every
/// store that needs the backend.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    timeout: Duration,
    slot: ArcSwapOption<C::Handle>,
    connect_lock: Mutex<()>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, timeout: Duration) -> Self {
        Self {
            connector,
            timeout,
            slot: ArcSwapOption::empty(),
            connect_lock: Mutex::new(()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_connected(&self) -> bool {
        self.slot.load().is_some()
    }

    pub async fn connect(&self) -> Result<Arc<C::Handle>, StoreError> {
        if let Some(handle) = self.slot.load_full() {
            return Ok(handle);
        }

        let _guard = self.connect_lock.lock().await;
        if let Some(handle) = self.slot.load_full() {
            return Ok(handle);
        }

        debug!(timeout = ?self.timeout, "opening backend connection");
        let handle = tokio::time::timeout(self.timeout, self.connector.connect())
            .await
            .map_err(|_| {
                StoreError::Connectivity(format!("connect timed out after {:?}", self.timeout))
            })??;

        let handle = Arc::new(handle);
        self.slot.store(Some(handle.clone()));
        info!("backend connection established");
        Ok(handle)
    }

    /// Release the shared handle. Calling it again, or before any connect, is a no-op.
    pub async fn disconnect(&self) -> Result<(), StoreError> {
        if self.slot.load().is_none() {
            return Ok(());
        }

        let _guard = self.connect_lock.lock().await;
        match self.slot.swap(None) {
            Some(handle) => {
                self.connector.close(handle).await?;
                info!("backend connection closed");
                Ok(())
            }
            None => Ok(()),
        }
    }
}
