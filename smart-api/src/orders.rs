use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use smart_order::models::{CustomerInfo, OrderStatus};
use smart_order::orchestrator::OrderItemRequest;
use smart_order::repository::OrderRepository as _;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemRequest>,
    pub customer_info: CustomerInfo,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let order = state
        .orchestrator
        .place_order(req.items, req.customer_info)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Order created successfully",
            "data": order,
        })),
    ))
}

/// GET /api/orders?status=
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Value>, ApiError> {
    let filter = match query.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<OrderStatus>()
                .map_err(|_| ApiError::Validation(
                    "Invalid status. Must be pending, completed, or cancelled".to_string(),
                ))?,
        ),
    };

    let orders = state.orders.list(filter).await?;

    Ok(Json(json!({
        "success": true,
        "count": orders.len(),
        "data": orders,
    })))
}

/// GET /api/orders/stats
pub async fn get_order_stats(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let stats = state.orders.stats().await?;

    Ok(Json(json!({
        "success": true,
        "data": stats,
    })))
}

/// GET /api/orders/{orderId}
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let order = state
        .orders
        .find_by_id(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": order,
    })))
}

/// PATCH /api/orders/{orderId}/status
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, ApiError> {
    let order = state
        .orchestrator
        .update_status(order_id, &req.status)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Order status updated successfully",
        "data": order,
    })))
}

/// PATCH /api/orders/{orderId}/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let order = state.orchestrator.cancel_order(order_id).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Order cancelled successfully and stock restored",
        "data": order,
    })))
}

/// DELETE /api/orders/{orderId}
pub async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let order = state
        .orders
        .delete(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    tracing::info!(%order_id, "order deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Order deleted successfully",
        "data": {
            "deletedOrder": {
                "orderId": order.order_id,
                "customerName": order.customer_info.name,
            },
        },
    })))
}
