use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use ambumed_infra::MedicineService;
use ambumed_medicine::{InventoryPatch, NewInventoryEntry};

use crate::app::errors;

pub fn router() -> Router {
    Router::new()
        .route("/:ambulance_id/entries", get(list_entries).post(create_entry))
        .route(
            "/:ambulance_id/entries/:entry_id",
            get(get_entry).put(update_entry).delete(delete_entry),
        )
}

pub async fn list_entries(
    Extension(services): Extension<Arc<MedicineService>>,
    Path(ambulance_id): Path<String>,
) -> axum::response::Response {
    match services.inventory_entries(&ambulance_id).await {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}

pub async fn create_entry(
    Extension(services): Extension<Arc<MedicineService>>,
    Path(ambulance_id): Path<String>,
    body: Result<Json<NewInventoryEntry>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    match services.create_inventory_entry(&ambulance_id, body).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}

pub async fn get_entry(
    Extension(services): Extension<Arc<MedicineService>>,
    Path((ambulance_id, entry_id)): Path<(String, String)>,
) -> axum::response::Response {
    match services.inventory_entry(&ambulance_id, &entry_id).await {
        Ok(entry) => (StatusCode::OK, Json(entry)).into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}

/// A zero count removes the entry and answers 204.
pub async fn update_entry(
    Extension(services): Extension<Arc<MedicineService>>,
    Path((ambulance_id, entry_id)): Path<(String, String)>,
    body: Result<Json<InventoryPatch>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    match services
        .update_inventory_entry(&ambulance_id, &entry_id, body)
        .await
    {
        Ok(Some(entry)) => (StatusCode::OK, Json(entry)).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}

pub async fn delete_entry(
    Extension(services): Extension<Arc<MedicineService>>,
    Path((ambulance_id, entry_id)): Path<(String, String)>,
) -> axum::response::Response {
    match services.delete_inventory_entry(&ambulance_id, &entry_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}
