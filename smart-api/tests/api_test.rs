use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use smart_api::state::{AppState, AuthConfig};
use smart_api::app;
use smart_order::orchestrator::OrderOrchestrator;
use smart_store::user_repo::ensure_seed_users;
use smart_store::{MemoryCatalog, MemoryOrders, MemoryUsers};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceExt;

async fn test_app() -> Router {
    let catalog = Arc::new(MemoryCatalog::new());
    let orders = Arc::new(MemoryOrders::new());
    let users = Arc::new(MemoryUsers::new());
    ensure_seed_users(users.as_ref()).await.unwrap();

    let orchestrator = Arc::new(OrderOrchestrator::new(
        catalog.clone(),
        catalog.clone(),
        orders.clone(),
    ));

    app(AppState {
        products: catalog.clone(),
        ledger: catalog,
        orders,
        users,
        orchestrator,
        auth: AuthConfig {
            secret: "test-secret".to_string(),
            expiration_seconds: 3600,
        },
        started_at: Instant::now(),
    })
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
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
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

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}

fn product_body(product_id: &str, sku: &str, price_cents: i64, stock: i64) -> Value {
    json!({
        "productId": product_id,
        "productName": format!("Product {product_id}"),
        "skuCode": sku,
        "category": "Grocery",
        "pricePerUnitCents": price_cents,
        "stockAvailable": stock,
    })
}

fn order_body(product_id: &str, quantity: i64) -> Value {
    json!({
        "items": [{"productId": product_id, "quantity": quantity}],
        "customerInfo": {"name": "Asha", "email": "asha@example.com", "phone": "555-0100"},
    })
}

#[tokio::test]
async fn root_and_health_are_public() {
    let app = test_app().await;

    let (status, body) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to S-Mart API");

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn unknown_routes_fall_back_to_json_404() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/nothing-here", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
    assert_eq!(body["path"], "/api/nothing-here");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "admin", "password": "nope"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn product_routes_are_role_gated() {
    let app = test_app().await;
    let staff = login(&app, "staff", "staff123").await;

    // No token at all
    let (status, _) = send(&app, "GET", "/api/products", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Staff may read but not create
    let (status, _) = send(&app, "GET", "/api/products", Some(&staff), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(&staff),
        Some(product_body("P001", "SKU1", 45000, 5)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");
}

#[tokio::test]
async fn product_crud_round_trip() {
    let app = test_app().await;
    let admin = login(&app, "admin", "admin123").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(&admin),
        Some(product_body("P001", "sku-rice", 45000, 5)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["skuCode"], "SKU-RICE");

    // Same SKU, different id
    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        Some(&admin),
        Some(product_body("P002", "SKU-RICE", 45000, 5)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Product with this ID or SKU already exists");

    let (status, body) = send(&app, "GET", "/api/products/P001", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stockAvailable"], 5);

    let (status, body) = send(&app, "DELETE", "/api/products/P001", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deletedProduct"]["productId"], "P001");

    let (status, _) = send(&app, "GET", "/api/products/P001", Some(&admin), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_patch_supports_both_shapes() {
    let app = test_app().await;
    let admin = login(&app, "admin", "admin123").await;
    send(
        &app,
        "POST",
        "/api/products",
        Some(&admin),
        Some(product_body("P001", "SKU1", 45000, 5)),
    )
    .await;

    // Direct set (admin override)
    let (status, body) = send(
        &app,
        "PATCH",
        "/api/products/P001/stock",
        Some(&admin),
        Some(json!({"stockAvailable": 42})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stockAvailable"], 42);

    // Ledger operations
    let (status, body) = send(
        &app,
        "PATCH",
        "/api/products/P001/stock",
        Some(&admin),
        Some(json!({"operation": "reduce", "stockQuantity": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["currentStock"], 40);

    let (status, body) = send(
        &app,
        "PATCH",
        "/api/products/P001/stock",
        Some(&admin),
        Some(json!({"operation": "add", "stockQuantity": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["currentStock"], 50);

    // Reduce past zero is refused
    let (status, body) = send(
        &app,
        "PATCH",
        "/api/products/P001/stock",
        Some(&admin),
        Some(json!({"operation": "reduce", "stockQuantity": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Insufficient stock"));

    // Unknown operation
    let (status, body) = send(
        &app,
        "PATCH",
        "/api/products/P001/stock",
        Some(&admin),
        Some(json!({"operation": "increment", "stockQuantity": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid operation. Use \"add\" or \"reduce\"");
}

#[tokio::test]
async fn order_flow_reduces_and_restores_stock() {
    let app = test_app().await;
    let admin = login(&app, "admin", "admin123").await;
    let staff = login(&app, "staff", "staff123").await;
    send(
        &app,
        "POST",
        "/api/products",
        Some(&admin),
        Some(product_body("P001", "SKU1", 45000, 5)),
    )
    .await;

    // Staff orders the whole shelf
    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&staff),
        Some(order_body("P001", 5)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["totalAmountCents"], 225000);
    let order_id = body["data"]["orderId"].as_str().unwrap().to_string();

    let (_, body) = send(&app, "GET", "/api/products/P001", Some(&staff), None).await;
    assert_eq!(body["data"]["stockAvailable"], 0);

    // Nothing left
    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&staff),
        Some(order_body("P001", 1)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("Available: 0, Requested: 1"),
        "{body}"
    );

    // Unknown product is a 404
    let (status, _) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&staff),
        Some(order_body("GHOST", 1)),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Cancel restores the stock
    let uri = format!("/api/orders/{order_id}/cancel");
    let (status, body) = send(&app, "PATCH", &uri, Some(&staff), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Order cancelled successfully and stock restored");
    assert_eq!(body["data"]["status"], "cancelled");

    let (_, body) = send(&app, "GET", "/api/products/P001", Some(&staff), None).await;
    assert_eq!(body["data"]["stockAvailable"], 5);

    // A second cancel is rejected
    let (status, body) = send(&app, "PATCH", &uri, Some(&staff), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot cancel a cancelled order");
}

#[tokio::test]
async fn completed_orders_refuse_cancellation() {
    let app = test_app().await;
    let admin = login(&app, "admin", "admin123").await;
    send(
        &app,
        "POST",
        "/api/products",
        Some(&admin),
        Some(product_body("P001", "SKU1", 45000, 5)),
    )
    .await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&admin),
        Some(order_body("P001", 2)),
    )
    .await;
    let order_id = body["data"]["orderId"].as_str().unwrap().to_string();

    let uri = format!("/api/orders/{order_id}/status");
    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(&admin),
        Some(json!({"status": "completed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");

    let uri = format!("/api/orders/{order_id}/cancel");
    let (status, body) = send(&app, "PATCH", &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot cancel a completed order");

    // Stock unchanged by the refused cancel
    let (_, body) = send(&app, "GET", "/api/products/P001", Some(&admin), None).await;
    assert_eq!(body["data"]["stockAvailable"], 3);
}

#[tokio::test]
async fn status_patch_validates_the_status_string() {
    let app = test_app().await;
    let admin = login(&app, "admin", "admin123").await;
    send(
        &app,
        "POST",
        "/api/products",
        Some(&admin),
        Some(product_body("P001", "SKU1", 45000, 5)),
    )
    .await;
    let (_, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&admin),
        Some(order_body("P001", 1)),
    )
    .await;
    let order_id = body["data"]["orderId"].as_str().unwrap().to_string();

    let uri = format!("/api/orders/{order_id}/status");
    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(&admin),
        Some(json!({"status": "shipped"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid status. Must be pending, completed, or cancelled"
    );
}

#[tokio::test]
async fn stats_track_counts_and_completed_revenue() {
    let app = test_app().await;
    let admin = login(&app, "admin", "admin123").await;
    send(
        &app,
        "POST",
        "/api/products",
        Some(&admin),
        Some(product_body("P001", "SKU1", 10000, 50)),
    )
    .await;

    // One completed, one pending, one cancelled
    let (_, body) = send(&app, "POST", "/api/orders", Some(&admin), Some(order_body("P001", 2))).await;
    let completed_id = body["data"]["orderId"].as_str().unwrap().to_string();
    send(
        &app,
        "PATCH",
        &format!("/api/orders/{completed_id}/status"),
        Some(&admin),
        Some(json!({"status": "completed"})),
    )
    .await;

    send(&app, "POST", "/api/orders", Some(&admin), Some(order_body("P001", 1))).await;

    let (_, body) = send(&app, "POST", "/api/orders", Some(&admin), Some(order_body("P001", 3))).await;
    let cancelled_id = body["data"]["orderId"].as_str().unwrap().to_string();
    send(
        &app,
        "PATCH",
        &format!("/api/orders/{cancelled_id}/cancel"),
        Some(&admin),
        None,
    )
    .await;

    let (status, body) = send(&app, "GET", "/api/orders/stats", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["totalOrders"], 3);
    assert_eq!(body["data"]["pendingOrders"], 1);
    assert_eq!(body["data"]["completedOrders"], 1);
    assert_eq!(body["data"]["cancelledOrders"], 1);
    assert_eq!(body["data"]["totalRevenueCents"], 20000);

    let (status, body) = send(&app, "GET", "/api/orders?status=pending", Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn registration_and_profile_flow() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "ravi",
            "email": "Ravi@Example.com",
            "password": "hunter22",
            "fullName": "Ravi Kumar",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["role"], "staff");
    assert_eq!(body["data"]["email"], "ravi@example.com");

    // Duplicate username
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "username": "ravi",
            "email": "other@example.com",
            "password": "hunter22",
            "fullName": "Ravi Kumar",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let token = login(&app, "ravi", "hunter22").await;
    let (status, body) = send(&app, "GET", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "ravi");
    assert!(body["data"].get("passwordHash").is_none());

    // Staff cannot use the admin registration endpoint
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/admin/register",
        Some(&token),
        Some(json!({
            "username": "mallory",
            "email": "mallory@example.com",
            "password": "mallory1",
            "fullName": "Mallory",
            "role": "admin",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let app = test_app().await;
    let token = login(&app, "staff", "staff123").await;

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/auth/change-password",
        Some(&token),
        Some(json!({"currentPassword": "wrong", "newPassword": "newpass1"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/auth/change-password",
        Some(&token),
        Some(json!({"currentPassword": "staff123", "newPassword": "newpass1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old password no longer works, new one does
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"username": "staff", "password": "staff123"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    login(&app, "staff", "newpass1").await;
}
