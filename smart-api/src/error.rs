use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use smart_catalog::inventory::InventoryError;
use smart_catalog::product::ProductError;
use smart_order::lifecycle::OrderError;
use smart_store::UserStoreError;

#[derive(Debug)]
pub enum ApiError {
    Authentication(String),
    Authorization(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Authentication(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::Authorization(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Internal(err) => {
                tracing::error!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
        }));

        (status, body).into_response()
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(_) => ApiError::NotFound(err.to_string()),
            ProductError::DuplicateKey => ApiError::Conflict(err.to_string()),
            ProductError::Validation(msg) => ApiError::Validation(msg),
            ProductError::Backend(msg) => ApiError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<InventoryError> for ApiError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::NotFound(_) => ApiError::NotFound("Product not found".to_string()),
            InventoryError::InsufficientStock { .. } => ApiError::Validation(err.to_string()),
            InventoryError::InvalidQuantity(_) => ApiError::Validation(err.to_string()),
            InventoryError::Backend(msg) => ApiError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound(_) => ApiError::NotFound("Order not found".to_string()),
            OrderError::ProductNotFound(_) => ApiError::NotFound(err.to_string()),
            OrderError::InsufficientStock { .. }
            | OrderError::InvalidTransition { .. }
            | OrderError::CancelRejected(_)
            | OrderError::InvalidStatus(_) => ApiError::Validation(err.to_string()),
            OrderError::Validation(msg) => ApiError::Validation(msg),
            OrderError::DuplicateOrder(_) => ApiError::Conflict(err.to_string()),
            OrderError::Storage(msg) => ApiError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

impl From<UserStoreError> for ApiError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::Duplicate => ApiError::Conflict(err.to_string()),
            UserStoreError::Hash(msg) | UserStoreError::Backend(msg) => {
                ApiError::Internal(anyhow::anyhow!(msg))
            }
        }
    }
}
