use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use ambumed_infra::MedicineService;
use ambumed_medicine::NewAmbulance;

use crate::app::errors;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_ambulance))
        .route("/:ambulance_id", get(get_ambulance).delete(delete_ambulance))
}

pub async fn create_ambulance(
    Extension(services): Extension<Arc<MedicineService>>,
    body: Result<Json<NewAmbulance>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(e) => return errors::json_rejection_to_response(e),
    };

    match services.create_ambulance(body).await {
        Ok(ambulance) => (StatusCode::CREATED, Json(ambulance)).into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}

pub async fn get_ambulance(
    Extension(services): Extension<Arc<MedicineService>>,
    Path(ambulance_id): Path<String>,
) -> axum::response::Response {
    match services.ambulance(&ambulance_id).await {
        Ok(ambulance) => (StatusCode::OK, Json(ambulance)).into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}

pub async fn delete_ambulance(
    Extension(services): Extension<Arc<MedicineService>>,
    Path(ambulance_id): Path<String>,
) -> axum::response::Response {
    match services.delete_ambulance(&ambulance_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}
