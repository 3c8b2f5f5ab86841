use std::sync::Arc;

use ambumed_api::app::{
    self,
    services::{AppConfig, StorageBackend},
};
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, backed by seeded in-memory stores on an ephemeral port.
        let config = AppConfig {
            storage: StorageBackend::Memory,
            ..AppConfig::default()
        };
        let services = Arc::new(app::services::build_services(&config).await.unwrap());
        let router = app::build_app(services);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_ambulance(client: &reqwest::Client, srv: &TestServer, id: &str) {
    let res = client
        .post(srv.url("/api/ambulance"))
        .json(&json!({ "id": id, "name": "Nemocnica", "roomNumber": "356" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

async fn set_order_status(
    client: &reqwest::Client,
    srv: &TestServer,
    order_path: &str,
    status_id: u32,
) -> reqwest::Response {
    client
        .put(srv.url(order_path))
        .json(&json!({ "status": { "id": status_id } }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn order_lifecycle_create_ship_reject_skip() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create_ambulance(&client, &srv, "amb-1").await;

    // Create an order for 20 units; it starts in the initial status.
    let res = client
        .post(srv.url("/api/medicine-order/amb-1/entries"))
        .json(&json!({ "medicineId": "m1", "name": "Paralen", "count": 20 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: Value = res.json().await.unwrap();
    assert_eq!(order["status"]["id"], 1);
    assert_eq!(order["count"], 20);
    let order_id = order["id"].as_str().unwrap().to_string();
    let order_path = format!("/api/medicine-order/amb-1/entries/{order_id}");

    // A second order for the same medicine conflicts.
    let res = client
        .post(srv.url("/api/medicine-order/amb-1/entries"))
        .json(&json!({ "medicineId": "m1", "count": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // To_ship cannot jump straight to Delivered.
    let res = set_order_status(&client, &srv, &order_path, 3).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    // To_ship -> Shipped is persisted.
    let res = set_order_status(&client, &srv, &order_path, 2).await;
    assert_eq!(res.status(), StatusCode::OK);
    let stored: Value = client
        .get(srv.url(&order_path))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stored["status"]["value"], "Shipped");
    assert_eq!(stored["status"]["validTransitions"], json!([3, 4]));

    // Shipped -> Delivered folds the order into inventory.
    let res = set_order_status(&client, &srv, &order_path, 3).await;
    assert_eq!(res.status(), StatusCode::OK);
    let inventory: Value = client
        .get(srv.url("/api/medicine-inventory/amb-1/entries"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        inventory,
        json!([{ "id": order_id, "medicineId": "m1", "name": "Paralen", "count": 20 }])
    );

    // Delivered is terminal.
    let res = set_order_status(&client, &srv, &order_path, 4).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_identity_and_status_content_are_immutable() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create_ambulance(&client, &srv, "amb-1").await;

    let res = client
        .post(srv.url("/api/medicine-order/amb-1/entries"))
        .json(&json!({ "id": "o1", "medicineId": "m1", "count": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    for patch in [
        json!({ "medicineId": "m2" }),
        json!({ "status": { "id": 2, "value": "Delivered" } }),
    ] {
        let res = client
            .put(srv.url("/api/medicine-order/amb-1/entries/o1"))
            .json(&patch)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn inventory_zero_count_removes_entry() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create_ambulance(&client, &srv, "amb-1").await;

    let res = client
        .post(srv.url("/api/medicine-inventory/amb-1/entries"))
        .json(&json!({ "id": "e1", "medicineId": "m1", "name": "Ibalgin", "count": 7 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .put(srv.url("/api/medicine-inventory/amb-1/entries/e1"))
        .json(&json!({ "count": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(srv.url("/api/medicine-inventory/amb-1/entries/e1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn unknown_ambulance_is_not_found() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/api/medicine-order/missing/entries"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(srv.url("/api/ambulance/missing"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();
    create_ambulance(&client, &srv, "amb-1").await;

    let res = client
        .post(srv.url("/api/medicine-order/amb-1/entries"))
        .json(&json!({ "medicineId": "m1", "count": "many" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");
}

#[tokio::test]
async fn status_catalog_is_exposed() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let statuses: Value = client
        .get(srv.url("/api/order-status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(statuses.as_array().unwrap().len(), 4);

    let initial: Value = client
        .get(srv.url("/api/order-status/initial"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(initial["value"], "To_ship");

    let res = client.get(srv.url("/api/order-status/42")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.get(srv.url("/api/order-status/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
