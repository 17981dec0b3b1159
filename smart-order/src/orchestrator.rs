use crate::lifecycle::{self, OrderError};
use crate::models::{CustomerInfo, Order, OrderItem, OrderStatus};
use crate::repository::OrderRepository;
use serde::Deserialize;
use smart_catalog::inventory::{InventoryError, StockLedger};
use smart_catalog::product::{ProductError, ProductRepository};
use std::sync::Arc;
use uuid::Uuid;

/// One requested line of a new order
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Coordinates catalog lookups, ledger mutations and order persistence as
/// one logical unit of work.
pub struct OrderOrchestrator {
    catalog: Arc<dyn ProductRepository>,
    ledger: Arc<dyn StockLedger>,
    orders: Arc<dyn OrderRepository>,
}

impl OrderOrchestrator {
    pub fn new(
        catalog: Arc<dyn ProductRepository>,
        ledger: Arc<dyn StockLedger>,
        orders: Arc<dyn OrderRepository>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            orders,
        }
    }

    /// Place an order: resolve and pre-check every line, then debit stock
    /// item by item through the ledger's atomic conditional decrement, then
    /// persist the pending order.
    ///
    /// All-or-nothing: a failed decrement rolls back the decrements already
    /// applied, a failed insert rolls back all of them. Either the order is
    /// persisted with every line debited, or stock is untouched and no
    /// order exists.
    pub async fn place_order(
        &self,
        items: Vec<OrderItemRequest>,
        customer_info: CustomerInfo,
    ) -> Result<Order, OrderError> {
        if items.is_empty() {
            return Err(OrderError::Validation(
                "Order must contain at least one item".to_string(),
            ));
        }

        // Resolve products and snapshot name/price, checking availability
        // for every line before touching any stock. The check repeats inside
        // the ledger's guarded decrement below; this pass exists to reject a
        // doomed multi-item order without partial debits.
        let mut lines = Vec::with_capacity(items.len());
        for request in &items {
            if request.quantity < 1 {
                return Err(OrderError::Validation(format!(
                    "Quantity for product {} must be at least 1",
                    request.product_id
                )));
            }
            let product = self
                .catalog
                .find_by_id(&request.product_id)
                .await
                .map_err(product_storage)?
                .ok_or_else(|| OrderError::ProductNotFound(request.product_id.clone()))?;
            if product.stock_available < request.quantity {
                return Err(OrderError::InsufficientStock {
                    product_name: product.product_name,
                    available: product.stock_available,
                    requested: request.quantity,
                });
            }
            lines.push(OrderItem::new(
                product.product_id,
                product.product_name,
                request.quantity,
                product.price_per_unit_cents,
            ));
        }

        let order = Order::new(lines, customer_info);

        let mut debited: Vec<(String, i64)> = Vec::with_capacity(order.items.len());
        for item in &order.items {
            match self.ledger.reduce(&item.product_id, item.quantity).await {
                Ok(_) => debited.push((item.product_id.clone(), item.quantity)),
                Err(err) => {
                    self.compensate(&debited).await;
                    return Err(ledger_error(err, &item.product_name));
                }
            }
        }

        if let Err(err) = self.orders.insert(&order).await {
            self.compensate(&debited).await;
            return Err(err);
        }

        tracing::info!(order_id = %order.order_id, total_cents = order.total_amount_cents, "order placed");
        Ok(order)
    }

    /// Cancel an order. Rejected for terminal orders; a pending order has
    /// its stock restored before the status flips.
    pub async fn cancel_order(&self, order_id: Uuid) -> Result<Order, OrderError> {
        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        if order.status.is_terminal() {
            return Err(OrderError::CancelRejected(order.status));
        }

        for item in &order.items {
            match self.ledger.add(&item.product_id, item.quantity).await {
                Ok(_) => {}
                // Product deleted since the order was placed; there is no
                // counter left to restore.
                Err(InventoryError::NotFound(product_id)) => {
                    tracing::warn!(%order_id, %product_id, "product gone, skipping stock restore");
                }
                Err(err) => return Err(OrderError::Storage(err.to_string())),
            }
        }

        self.orders
            .update_status(order_id, OrderStatus::Cancelled)
            .await?;
        order.set_status(OrderStatus::Cancelled);
        tracing::info!(%order_id, "order cancelled, stock restored");
        Ok(order)
    }

    /// Apply a status change requested as a raw string. Unknown strings are
    /// `InvalidStatus`; a move to `cancelled` goes through the cancel path
    /// so stock restoration is never skipped.
    pub async fn update_status(&self, order_id: Uuid, status: &str) -> Result<Order, OrderError> {
        let target = status
            .parse::<OrderStatus>()
            .map_err(OrderError::InvalidStatus)?;

        if target == OrderStatus::Cancelled {
            return self.cancel_order(order_id).await;
        }

        let mut order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound(order_id))?;

        lifecycle::check_transition(order.status, target)?;

        self.orders.update_status(order_id, target).await?;
        order.set_status(target);
        Ok(order)
    }

    /// Add previously debited quantities back, most recent first. A failure
    /// here is logged and skipped: the remaining lines still must be
    /// restored.
    async fn compensate(&self, debited: &[(String, i64)]) {
        for (product_id, quantity) in debited.iter().rev() {
            if let Err(err) = self.ledger.add(product_id, *quantity).await {
                tracing::error!(%product_id, quantity, %err, "failed to restore stock during rollback");
            }
        }
    }
}

fn product_storage(err: ProductError) -> OrderError {
    OrderError::Storage(err.to_string())
}

fn ledger_error(err: InventoryError, product_name: &str) -> OrderError {
    match err {
        InventoryError::InsufficientStock {
            requested,
            available,
            ..
        } => OrderError::InsufficientStock {
            product_name: product_name.to_string(),
            available,
            requested,
        },
        InventoryError::NotFound(product_id) => OrderError::ProductNotFound(product_id),
        InventoryError::InvalidQuantity(quantity) => {
            OrderError::Validation(format!("Invalid quantity: {}", quantity))
        }
        InventoryError::Backend(message) => OrderError::Storage(message),
    }
}
