use crate::lifecycle::OrderError;
use crate::models::{Order, OrderStats, OrderStatus};
use async_trait::async_trait;
use uuid::Uuid;

/// Data access seam for orders
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order with its items; fails with `DuplicateOrder` when
    /// the orderId is already taken (the idempotency backstop for retries).
    async fn insert(&self, order: &Order) -> Result<(), OrderError>;

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderError>;

    /// List orders, newest first, optionally filtered by status.
    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, OrderError>;

    async fn update_status(&self, order_id: Uuid, status: OrderStatus) -> Result<(), OrderError>;

    /// Remove an order outright (admin housekeeping). Returns the deleted
    /// record when found.
    async fn delete(&self, order_id: Uuid) -> Result<Option<Order>, OrderError>;

    /// Counts per status plus revenue summed over completed orders.
    async fn stats(&self) -> Result<OrderStats, OrderError>;
}
