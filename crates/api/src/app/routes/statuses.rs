use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use ambumed_infra::MedicineService;

use crate::app::errors;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_statuses))
        .route("/initial", get(get_initial_status))
        .route("/:status_id", get(get_status))
}

pub async fn list_statuses(
    Extension(services): Extension<Arc<MedicineService>>,
) -> axum::response::Response {
    match services.statuses().await {
        Ok(statuses) => (StatusCode::OK, Json(statuses)).into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}

pub async fn get_initial_status(
    Extension(services): Extension<Arc<MedicineService>>,
) -> axum::response::Response {
    match services.initial_status().await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}

pub async fn get_status(
    Extension(services): Extension<Arc<MedicineService>>,
    Path(status_id): Path<String>,
) -> axum::response::Response {
    let status_id: u32 = match status_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid status id");
        }
    };

    match services.status(status_id).await {
        Ok(status) => (StatusCode::OK, Json(status)).into_response(),
        Err(e) => errors::update_error_to_response(e),
    }
}
