use async_trait::async_trait;

/// Relative stock mutations with a non-negativity guarantee.
///
/// `reduce` is a single atomic conditional decrement: the availability check
/// and the write happen under the same per-product guard, so two concurrent
/// callers can never jointly overdraw a product. Sequencing across the
/// multiple products of one order is the orchestrator's job.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Atomically decrement `stock_available` by `quantity`, failing with
    /// `InsufficientStock` when the result would go negative. Returns the
    /// stock level after the decrement.
    async fn reduce(&self, product_id: &str, quantity: i64) -> Result<i64, InventoryError>;

    /// Increment `stock_available` by `quantity` (restoring previously
    /// reduced stock). `quantity` must be >= 0. Returns the new level.
    async fn add(&self, product_id: &str, quantity: i64) -> Result<i64, InventoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: i64,
        available: i64,
    },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    #[error("storage backend error: {0}")]
    Backend(String),
}
