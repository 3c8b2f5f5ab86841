use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use ambumed_infra::MedicineService;
use ambumed_medicine::{NewOrder, OrderPatch};

use crate::app::errors;

pub fn router() -> Router {
    Router::new()
        .route("/:ambulance_id/entries", get(list_orders).post(create_order))
        .route(
            "/:ambulance_id/entries/:order_id",
            get(get_order).put(update_order).delete(delete_order),
        )
}

pub async fn list_orders(
    Extension(services): Extension<Arc<MedicineService>>,
    Path(ambulance_id): Path<String>,
) -> axum::response::Response {
    match services.orders(&ambulance_id).await {
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}

pub async fn create_order(
    Extension(services): Extension<Arc<MedicineService>>,
    Path(ambulance_id): Path<String>,
    body: Result<Json<NewOrder>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    match services.create_order(&ambulance_id, body).await {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<MedicineService>>,
    Path((ambulance_id, order_id)): Path<(String, String)>,
) -> axum::response::Response {
    match services.order(&ambulance_id, &order_id).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}

/// Partial update; `status.id` requests a transition.
pub async fn update_order(
    Extension(services): Extension<Arc<MedicineService>>,
    Path((ambulance_id, order_id)): Path<(String, String)>,
    body: Result<Json<OrderPatch>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    match services.update_order(&ambulance_id, &order_id, body).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<MedicineService>>,
    Path((ambulance_id, order_id)): Path<(String, String)>,
) -> axum::response::Response {
    match services.delete_order(&ambulance_id, &order_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}
