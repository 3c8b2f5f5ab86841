use axum::Router;

pub mod ambulances;
pub mod inventory;
pub mod orders;
pub mod statuses;
pub mod system;

/// Router for every resource endpoint (mounted under `/api`).
pub fn router() -> Router {
    Router::new()
        .nest("/ambulance", ambulances::router())
        .nest("/medicine-inventory", inventory::router())
        .nest("/medicine-order", orders::router())
        .nest("/order-status", statuses::router())
}
