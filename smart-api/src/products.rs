use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use smart_catalog::inventory::StockLedger as _;
use smart_catalog::product::{Product, ProductRepository as _};

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub product_id: String,
    pub product_name: String,
    pub sku_code: String,
    pub category: String,
    pub price_per_unit_cents: i64,
    #[serde(default)]
    pub stock_available: i64,
}

/// Two accepted shapes, as in the frontend contract: a direct
/// `{stockAvailable}` set, or `{operation, stockQuantity}` routed through
/// the ledger.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStockRequest {
    pub stock_available: Option<i64>,
    pub operation: Option<String>,
    pub stock_quantity: Option<i64>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let product = Product::new(
        req.product_id,
        req.product_name,
        &req.sku_code,
        req.category,
        req.price_per_unit_cents,
        req.stock_available,
    )?;

    state.products.insert(&product).await?;
    tracing::info!(product_id = %product.product_id, "product created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Product created successfully",
            "data": product,
        })),
    ))
}

/// GET /api/products
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let products = state.products.list().await?;

    Ok(Json(json!({
        "success": true,
        "count": products.len(),
        "data": products,
    })))
}

/// GET /api/products/{productId}
pub async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let product = state
        .products
        .find_by_id(&product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "data": product,
    })))
}

/// PATCH /api/products/{productId}/stock
pub async fn update_stock(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(req): Json<UpdateStockRequest>,
) -> Result<Json<Value>, ApiError> {
    // Direct set: the admin override path. It bypasses the ledger's relative
    // operations entirely; input validation and the schema floor it at 0.
    if let Some(value) = req.stock_available {
        let product = state
            .products
            .set_stock(&product_id, value)
            .await?
            .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

        tracing::info!(%product_id, value, "stock set directly");
        return Ok(Json(json!({
            "success": true,
            "message": "Stock updated successfully",
            "data": product,
        })));
    }

    let quantity = req.stock_quantity.ok_or_else(|| {
        ApiError::Validation("stockQuantity is required for add/reduce operations".to_string())
    })?;

    let current_stock = match req.operation.as_deref() {
        Some("add") => state.ledger.add(&product_id, quantity).await?,
        Some("reduce") => state.ledger.reduce(&product_id, quantity).await?,
        _ => {
            return Err(ApiError::Validation(
                "Invalid operation. Use \"add\" or \"reduce\"".to_string(),
            ))
        }
    };

    let product = state
        .products
        .find_by_id(&product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(Json(json!({
        "success": true,
        "message": "Stock updated successfully",
        "data": {
            "productId": product.product_id,
            "productName": product.product_name,
            "currentStock": current_stock,
        },
    })))
}

/// DELETE /api/products/{productId}
pub async fn delete_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let product = state
        .products
        .delete(&product_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    tracing::info!(%product_id, "product deleted");

    Ok(Json(json!({
        "success": true,
        "message": "Product deleted successfully",
        "data": {
            "deletedProduct": {
                "productId": product.product_id,
                "productName": product.product_name,
            },
        },
    })))
}
