//! Postgres-backed document store.
//!
//! All collections share one `documents` table keyed by `(collection, id)`,
//! with the document body stored as JSONB.
//!
//! ## Error Mapping
//!
//! | SQLx error | StoreError |
//! |------------|------------|
//! | `PoolTimedOut`, `PoolClosed`, `Io`, `Tls`, `WorkerCrashed` | `Connectivity` |
//! | `ColumnDecode`, `Decode`, `ColumnNotFound`, `TypeNotFound` | `Internal` |
//! | anything else | `Backend` |
//!
//! `NotFound` and `Conflict` are derived from affected-row counts, never from
//! database error codes, so each operation stays a single statement.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Row};
use tracing::{info, instrument};

use ambumed_core::DocumentId;

use super::r#trait::DocumentStore;
use crate::config::DocumentStoreConfig;
use crate::connection::{ConnectionManager, Connector};
use crate::error::StoreError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT   NOT NULL,
    id         TEXT   NOT NULL,
    seq        BIGSERIAL,
    body       JSONB  NOT NULL,
    PRIMARY KEY (collection, id)
)
"#;

/// Opens a Postgres pool and makes sure the `documents` table exists.
#[derive(Debug, Clone)]
pub struct PgConnector {
    config: DocumentStoreConfig,
}

impl PgConnector {
    pub fn new(config: DocumentStoreConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Handle = PgPool;

    async fn connect(&self) -> Result<PgPool, StoreError> {
        info!(url = %self.config.redacted_url(), "connecting to postgres");

        let options = PgConnectOptions::new()
            .host(&self.config.host)
            .port(self.config.port)
            .username(&self.config.username)
            .password(&self.config.password)
            .database(&self.config.database);

        let pool = PgPoolOptions::new()
            .acquire_timeout(self.config.timeout)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(pool)
    }

    async fn close(&self, pool: Arc<PgPool>) -> Result<(), StoreError> {
        pool.close().await;
        Ok(())
    }
}

/// Document store for one collection, sharing the process-wide connection.
pub struct PostgresDocumentStore<T> {
    manager: Arc<ConnectionManager<PgConnector>>,
    collection: String,
    _document: PhantomData<fn() -> T>,
}

impl<T> PostgresDocumentStore<T> {
    pub fn new(manager: Arc<ConnectionManager<PgConnector>>, collection: impl Into<String>) -> Self {
        Self {
            manager,
            collection: collection.into(),
            _document: PhantomData,
        }
    }

    fn timeout(&self) -> Duration {
        self.manager.timeout()
    }

    /// Run one backend round trip under a fresh deadline.
    async fn bounded<R>(
        &self,
        operation: &'static str,
        work: impl Future<Output = Result<R, StoreError>>,
    ) -> Result<R, StoreError> {
        tokio::time::timeout(self.timeout(), work)
            .await
            .map_err(|_| {
                StoreError::Connectivity(format!(
                    "{operation} on '{}' timed out after {:?}",
                    self.collection,
                    self.timeout()
                ))
            })?
    }
}

fn map_sqlx_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => StoreError::Connectivity(e.to_string()),
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::TypeNotFound { .. } => StoreError::Internal(e.to_string()),
        _ => StoreError::Backend(e.to_string()),
    }
}

fn encode<T: Serialize>(document: &T) -> Result<JsonValue, StoreError> {
    serde_json::to_value(document)
        .map_err(|e| StoreError::Internal(format!("document encoding failed: {e}")))
}

fn decode<T: DeserializeOwned>(body: JsonValue) -> Result<T, StoreError> {
    serde_json::from_value(body)
        .map_err(|e| StoreError::Internal(format!("document decoding failed: {e}")))
}

#[async_trait]
impl<T> DocumentStore<T> for PostgresDocumentStore<T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    fn collection(&self) -> &str {
        &self.collection
    }

    #[instrument(skip(self, document), fields(collection = %self.collection, id = %id), err)]
    async fn create(&self, id: &DocumentId, document: &T) -> Result<(), StoreError> {
        let body = encode(document)?;
        self.bounded("create", async {
            let pool = self.manager.connect().await?;
            let result = sqlx::query(
                r#"
                INSERT INTO documents (collection, id, body)
                VALUES ($1, $2, $3)
                ON CONFLICT (collection, id) DO NOTHING
                "#,
            )
            .bind(&self.collection)
            .bind(id.as_str())
            .bind(&body)
            .execute(&*pool)
            .await
            .map_err(map_sqlx_error)?;

            if result.rows_affected() == 0 {
                return Err(StoreError::conflict(&self.collection, id.clone()));
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self), fields(collection = %self.collection, id = %id), err)]
    async fn find(&self, id: &DocumentId) -> Result<T, StoreError> {
        self.bounded("find", async {
            let pool = self.manager.connect().await?;
            let row = sqlx::query("SELECT body FROM documents WHERE collection = $1 AND id = $2")
                .bind(&self.collection)
                .bind(id.as_str())
                .fetch_optional(&*pool)
                .await
                .map_err(map_sqlx_error)?
                .ok_or_else(|| StoreError::not_found(&self.collection, id.clone()))?;

            let body: JsonValue = row.try_get("body").map_err(map_sqlx_error)?;
            decode(body)
        })
        .await
    }

    #[instrument(skip(self), fields(collection = %self.collection), err)]
    async fn find_all(&self) -> Result<Vec<T>, StoreError> {
        self.bounded("find_all", async {
            let pool = self.manager.connect().await?;
            let rows = sqlx::query("SELECT body FROM documents WHERE collection = $1 ORDER BY seq ASC")
                .bind(&self.collection)
                .fetch_all(&*pool)
                .await
                .map_err(map_sqlx_error)?;

            rows.into_iter()
                .map(|row| {
                    let body: JsonValue = row.try_get("body").map_err(map_sqlx_error)?;
                    decode(body)
                })
                .collect()
        })
        .await
    }

    #[instrument(skip(self, document), fields(collection = %self.collection, id = %id), err)]
    async fn update(&self, id: &DocumentId, document: &T) -> Result<(), StoreError> {
        let body = encode(document)?;
        self.bounded("update", async {
            let pool = self.manager.connect().await?;
            let result =
                sqlx::query("UPDATE documents SET body = $3 WHERE collection = $1 AND id = $2")
                    .bind(&self.collection)
                    .bind(id.as_str())
                    .bind(&body)
                    .execute(&*pool)
                    .await
                    .map_err(map_sqlx_error)?;

            if result.rows_affected() == 0 {
                return Err(StoreError::not_found(&self.collection, id.clone()));
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self), fields(collection = %self.collection, id = %id), err)]
    async fn delete(&self, id: &DocumentId) -> Result<(), StoreError> {
        self.bounded("delete", async {
            let pool = self.manager.connect().await?;
            let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
                .bind(&self.collection)
                .bind(id.as_str())
                .execute(&*pool)
                .await
                .map_err(map_sqlx_error)?;

            if result.rows_affected() == 0 {
                return Err(StoreError::not_found(&self.collection, id.clone()));
            }
            Ok(())
        })
        .await
    }

    async fn disconnect(&self) -> Result<(), StoreError> {
        self.manager.disconnect().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_exhaustion_is_connectivity() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::PoolTimedOut),
            StoreError::Connectivity(_)
        ));
    }

    #[test]
    fn missing_column_is_internal() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::ColumnNotFound("body".to_string())),
            StoreError::Internal(_)
        ));
    }

    #[test]
    fn other_database_errors_are_backend_errors() {
        assert!(matches!(
            map_sqlx_error(sqlx::Error::RowNotFound),
            StoreError::Backend(_)
        ));
    }

    #[tokio::test]
    async fn unreachable_backend_fails_without_panicking() {
        let config = DocumentStoreConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            timeout: Duration::from_millis(200),
            ..Default::default()
        };
        let manager = Arc::new(ConnectionManager::new(
            PgConnector::new(config.clone()),
            config.timeout,
        ));
        let store = PostgresDocumentStore::<JsonValue>::new(manager, "scratch");

        let err = store.find(&DocumentId::from("x")).await.unwrap_err();
        assert!(matches!(err, StoreError::Connectivity(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn stalled_operation_times_out_as_connectivity() {
        let timeout = Duration::from_millis(20);
        let manager = Arc::new(ConnectionManager::new(
            PgConnector::new(DocumentStoreConfig::default()),
            timeout,
        ));
        let store = PostgresDocumentStore::<JsonValue>::new(manager.clone(), "scratch");

        let err = store
            .bounded("find", std::future::pending::<Result<(), StoreError>>())
            .await
            .unwrap_err();

        let message = match err {
            StoreError::Connectivity(message) => message,
            other => panic!("expected connectivity error, got {other:?}"),
        };
        assert!(message.contains("find on 'scratch' timed out"));
        assert!(!manager.is_connected());
    }
}
