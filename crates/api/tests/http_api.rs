//! Integration tests for the API server over the in-memory store.

use std::sync::{Arc, OnceLock};

use api::auth::{Identity, StaticTokenVerifier};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{Role, UserId};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use store::InMemoryStore;
use tower::ServiceExt;

const CLIENT_TOKEN: &str = "client-token";
const ADMIN_TOKEN: &str = "admin-token";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> Router {
    let mut verifier = StaticTokenVerifier::new();
    verifier.insert(
        CLIENT_TOKEN,
        Identity {
            user_id: UserId::new(),
            role: Role::Cliente,
        },
    );
    verifier.insert(
        ADMIN_TOKEN,
        Identity {
            user_id: UserId::new(),
            role: Role::Admin,
        },
    );

    let state = api::create_state(InMemoryStore::new(), Arc::new(verifier));
    api::create_app(state, get_metrics_handle())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Creates a product with stock through the admin endpoints and returns its
/// id as a string.
async fn seed_product(app: &Router, name: &str, price_cents: i64, stock: i64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/admin/products",
        Some(ADMIN_TOKEN),
        Some(json!({ "name": name, "price_cents": price_cents })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        app,
        "PUT",
        &format!("/admin/stock/{id}"),
        Some(ADMIN_TOKEN),
        Some(json!({ "quantity": stock })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    id
}

async fn seed_address(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/addresses",
        Some(CLIENT_TOKEN),
        Some(json!({ "city": "Córdoba", "street": "San Martín", "number": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = setup();
    let (status, _) = send(&app, "GET", "/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let app = setup();
    let (status, _) = send(&app, "GET", "/cart", Some("no-such-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_wrong_role_is_forbidden() {
    let app = setup();

    let (status, _) = send(&app, "GET", "/admin/orders", Some(CLIENT_TOKEN), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/cart", Some(ADMIN_TOKEN), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_products_are_public() {
    let app = setup();
    seed_product(&app, "Yerba", 1500, 10).await;

    let (status, body) = send(&app, "GET", "/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["name"], "Yerba");
    assert_eq!(body[0]["price_cents"], 1500);
}

#[tokio::test]
async fn test_place_order_end_to_end() {
    let app = setup();
    let product_id = seed_product(&app, "Yerba", 1500, 8).await;
    let address_id = seed_address(&app).await;

    // Add to cart.
    let (status, _) = send(
        &app,
        "POST",
        "/cart/lines",
        Some(CLIENT_TOKEN),
        Some(json!({ "product_id": product_id, "quantity": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, cart) = send(&app, "GET", "/cart", Some(CLIENT_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart.as_array().unwrap().len(), 1);
    assert_eq!(cart[0]["quantity"], 2);

    // Place the order.
    let (status, placed) = send(
        &app,
        "POST",
        "/orders",
        Some(CLIENT_TOKEN),
        Some(json!({ "address_id": address_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(placed["total_cents"], 3000);
    let order_id = placed["order_id"].as_str().unwrap().to_string();

    // Stock decremented and cart emptied.
    let (_, stock) = send(
        &app,
        "GET",
        &format!("/admin/stock/{product_id}"),
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(stock["quantity"], 6);
    assert_eq!(stock["status"], "En stock");

    let (_, cart) = send(&app, "GET", "/cart", Some(CLIENT_TOKEN), None).await;
    assert!(cart.as_array().unwrap().is_empty());

    // The snapshot keeps the purchase-time price after a catalog change.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/admin/products/{product_id}"),
        Some(ADMIN_TOKEN),
        Some(json!({ "price_cents": 9999 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, order) = send(
        &app,
        "GET",
        &format!("/orders/{order_id}"),
        Some(CLIENT_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["fulfillment_status"], "Pendiente");
    assert_eq!(order["payment_status"], "Pendiente");
    assert_eq!(order["total_cents"], 3000);
    assert_eq!(order["lines"][0]["unit_price_cents"], 1500);
    assert_eq!(order["lines"][0]["product_name"], "Yerba");
}

#[tokio::test]
async fn test_insufficient_stock_lists_shortfalls() {
    let app = setup();
    let product_id = seed_product(&app, "Yerba", 1500, 1).await;
    let address_id = seed_address(&app).await;

    send(
        &app,
        "POST",
        "/cart/lines",
        Some(CLIENT_TOKEN),
        Some(json!({ "product_id": product_id, "quantity": 5 })),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(CLIENT_TOKEN),
        Some(json!({ "address_id": address_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let shortfalls = body["shortfalls"].as_array().unwrap();
    assert_eq!(shortfalls.len(), 1);
    assert_eq!(shortfalls[0]["product_id"], product_id.as_str());
    assert_eq!(shortfalls[0]["requested"], 5);
    assert_eq!(shortfalls[0]["available"], 1);

    // Stock untouched.
    let (_, stock) = send(
        &app,
        "GET",
        &format!("/admin/stock/{product_id}"),
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(stock["quantity"], 1);
}

#[tokio::test]
async fn test_cancel_and_admin_status_flow() {
    let app = setup();
    let product_id = seed_product(&app, "Yerba", 1500, 10).await;
    let address_id = seed_address(&app).await;

    send(
        &app,
        "POST",
        "/cart/lines",
        Some(CLIENT_TOKEN),
        Some(json!({ "product_id": product_id, "quantity": 3 })),
    )
    .await;
    let (_, placed) = send(
        &app,
        "POST",
        "/orders",
        Some(CLIENT_TOKEN),
        Some(json!({ "address_id": address_id })),
    )
    .await;
    let order_id = placed["order_id"].as_str().unwrap().to_string();

    // Cancel restores stock.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/cancel"),
        Some(CLIENT_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, stock) = send(
        &app,
        "GET",
        &format!("/admin/stock/{product_id}"),
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(stock["quantity"], 10);

    // A second cancel is an illegal transition.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/orders/{order_id}/cancel"),
        Some(CLIENT_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Cancelado"));

    // Admin reactivates; stock is reserved again.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/admin/orders/{order_id}/status"),
        Some(ADMIN_TOKEN),
        Some(json!({ "fulfillment_status_id": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, stock) = send(
        &app,
        "GET",
        &format!("/admin/stock/{product_id}"),
        Some(ADMIN_TOKEN),
        None,
    )
    .await;
    assert_eq!(stock["quantity"], 7);

    // Payment status moves independently.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/admin/orders/{order_id}/status"),
        Some(ADMIN_TOKEN),
        Some(json!({ "payment_status_id": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, orders) = send(&app, "GET", "/admin/orders", Some(ADMIN_TOKEN), None).await;
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["payment_status"], "Pagado");

    // The audit trail recorded the stock-impacting transitions.
    let (status, audit) = send(&app, "GET", "/admin/audit", Some(ADMIN_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(audit.as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn test_add_to_cart_validation() {
    let app = setup();
    let product_id = seed_product(&app, "Yerba", 1500, 10).await;

    let (status, _) = send(
        &app,
        "POST",
        "/cart/lines",
        Some(CLIENT_TOKEN),
        Some(json!({ "product_id": product_id, "quantity": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/cart/lines",
        Some(CLIENT_TOKEN),
        Some(json!({ "product_id": product_id, "quantity": -2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/cart/lines",
        Some(CLIENT_TOKEN),
        Some(json!({ "product_id": uuid::Uuid::new_v4().to_string(), "quantity": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_empty_cart_cannot_place_order() {
    let app = setup();
    let address_id = seed_address(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/orders",
        Some(CLIENT_TOKEN),
        Some(json!({ "address_id": address_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("cart is empty"));
}

#[tokio::test]
async fn test_payment_method_types_are_seeded() {
    let app = setup();
    let (status, body) = send(&app, "GET", "/payment-method-types", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Efectivo", "Tarjeta", "MercadoPago"]);
}

#[tokio::test]
async fn test_saved_payment_method_roundtrip() {
    let app = setup();

    let (status, method) = send(
        &app,
        "POST",
        "/payment-methods",
        Some(CLIENT_TOKEN),
        Some(json!({ "type_id": 2, "holder": "J. Perez", "last4": "4242" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(method["type_id"], 2);

    let (status, methods) = send(&app, "GET", "/payment-methods", Some(CLIENT_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(methods.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_order_is_not_found() {
    let app = setup();
    let (status, _) = send(
        &app,
        "GET",
        &format!("/orders/{}", uuid::Uuid::new_v4()),
        Some(CLIENT_TOKEN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
