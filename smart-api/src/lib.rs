use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod error;
pub mod middleware;
pub mod orders;
pub mod products;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let staff = axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::auth::staff_auth_middleware,
    );
    let admin = axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::auth::admin_auth_middleware,
    );

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .merge(
            Router::new()
                .route("/profile", get(auth::profile))
                .route("/change-password", patch(auth::change_password))
                .route_layer(staff.clone()),
        )
        .merge(
            Router::new()
                .route("/admin/register", post(auth::admin_register))
                .route_layer(admin.clone()),
        );

    let product_routes = Router::new()
        .route("/", get(products::list_products))
        .route("/{product_id}", get(products::get_product))
        .route_layer(staff.clone())
        .merge(
            Router::new()
                .route("/", post(products::create_product))
                .route("/{product_id}", delete(products::delete_product))
                .route("/{product_id}/stock", patch(products::update_stock))
                .route_layer(admin.clone()),
        );

    let order_routes = Router::new()
        .route("/", post(orders::create_order).get(orders::list_orders))
        .route("/stats", get(orders::get_order_stats))
        .route("/{order_id}", get(orders::get_order))
        .route("/{order_id}/status", patch(orders::update_order_status))
        .route("/{order_id}/cancel", patch(orders::cancel_order))
        .route_layer(staff)
        .merge(
            Router::new()
                .route("/{order_id}", delete(orders::delete_order))
                .route_layer(admin),
        );

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .nest("/api/auth", auth_routes)
        .nest("/api/products", product_routes)
        .nest("/api/orders", order_routes)
        .fallback(not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to S-Mart API",
        "status": "Server is running successfully",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "uptimeSeconds": state.started_at.elapsed().as_secs(),
        "timestamp": Utc::now().to_rfc3339(),
        "environment": std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()),
    }))
}

async fn not_found(uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "message": "Route not found",
            "path": uri.path(),
        })),
    )
}
