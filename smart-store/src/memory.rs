use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use smart_catalog::inventory::{InventoryError, StockLedger};
use smart_catalog::product::{Product, ProductError, ProductRepository};
use smart_order::lifecycle::OrderError;
use smart_order::models::{Order, OrderStats, OrderStatus};
use smart_order::repository::OrderRepository;
use smart_shared::models::user::User;
use uuid::Uuid;

use crate::user_repo::{UserRepository, UserStoreError};

/// Map-backed catalog + ledger. The per-key entry lock of the map makes
/// `reduce` an atomic check-and-decrement, the in-memory analogue of the
/// guarded UPDATE in the Postgres repository.
#[derive(Default)]
pub struct MemoryCatalog {
    products: DashMap<String, Product>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryCatalog {
    async fn insert(&self, product: &Product) -> Result<(), ProductError> {
        let sku_taken = self
            .products
            .iter()
            .any(|existing| existing.sku_code == product.sku_code);
        if sku_taken || self.products.contains_key(&product.product_id) {
            return Err(ProductError::DuplicateKey);
        }
        self.products
            .insert(product.product_id.clone(), product.clone());
        Ok(())
    }

    async fn find_by_id(&self, product_id: &str) -> Result<Option<Product>, ProductError> {
        Ok(self.products.get(product_id).map(|p| p.value().clone()))
    }

    async fn list(&self) -> Result<Vec<Product>, ProductError> {
        let mut products: Vec<Product> = self.products.iter().map(|p| p.value().clone()).collect();
        products.sort_by(|a, b| a.product_name.cmp(&b.product_name));
        Ok(products)
    }

    async fn delete(&self, product_id: &str) -> Result<Option<Product>, ProductError> {
        Ok(self.products.remove(product_id).map(|(_, product)| product))
    }

    async fn set_stock(&self, product_id: &str, value: i64) -> Result<Option<Product>, ProductError> {
        if value < 0 {
            return Err(ProductError::Validation(
                "stockAvailable must not be negative".to_string(),
            ));
        }
        match self.products.get_mut(product_id) {
            Some(mut product) => {
                product.stock_available = value;
                product.updated_at = Utc::now();
                Ok(Some(product.value().clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl StockLedger for MemoryCatalog {
    async fn reduce(&self, product_id: &str, quantity: i64) -> Result<i64, InventoryError> {
        if quantity < 0 {
            return Err(InventoryError::InvalidQuantity(quantity));
        }
        let mut product = self
            .products
            .get_mut(product_id)
            .ok_or_else(|| InventoryError::NotFound(product_id.to_string()))?;

        if product.stock_available < quantity {
            return Err(InventoryError::InsufficientStock {
                product_id: product_id.to_string(),
                requested: quantity,
                available: product.stock_available,
            });
        }

        product.stock_available -= quantity;
        product.updated_at = Utc::now();
        Ok(product.stock_available)
    }

    async fn add(&self, product_id: &str, quantity: i64) -> Result<i64, InventoryError> {
        if quantity < 0 {
            return Err(InventoryError::InvalidQuantity(quantity));
        }
        let mut product = self
            .products
            .get_mut(product_id)
            .ok_or_else(|| InventoryError::NotFound(product_id.to_string()))?;

        product.stock_available += quantity;
        product.updated_at = Utc::now();
        Ok(product.stock_available)
    }
}

/// Map-backed order store
#[derive(Default)]
pub struct MemoryOrders {
    orders: DashMap<Uuid, Order>,
}

impl MemoryOrders {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for MemoryOrders {
    async fn insert(&self, order: &Order) -> Result<(), OrderError> {
        match self.orders.entry(order.order_id) {
            Entry::Occupied(_) => Err(OrderError::DuplicateOrder(order.order_id)),
            Entry::Vacant(slot) => {
                slot.insert(order.clone());
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        Ok(self.orders.get(&order_id).map(|o| o.value().clone()))
    }

    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, OrderError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|order| status.map_or(true, |wanted| order.status == wanted))
            .map(|o| o.value().clone())
            .collect();
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
        Ok(orders)
    }

    async fn update_status(&self, order_id: Uuid, status: OrderStatus) -> Result<(), OrderError> {
        let mut order = self
            .orders
            .get_mut(&order_id)
            .ok_or(OrderError::NotFound(order_id))?;
        order.set_status(status);
        Ok(())
    }

    async fn delete(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        Ok(self.orders.remove(&order_id).map(|(_, order)| order))
    }

    async fn stats(&self) -> Result<OrderStats, OrderError> {
        let mut stats = OrderStats {
            total_orders: 0,
            pending_orders: 0,
            completed_orders: 0,
            cancelled_orders: 0,
            total_revenue_cents: 0,
        };
        for order in self.orders.iter() {
            stats.total_orders += 1;
            match order.status {
                OrderStatus::Pending => stats.pending_orders += 1,
                OrderStatus::Completed => {
                    stats.completed_orders += 1;
                    stats.total_revenue_cents += order.total_amount_cents;
                }
                OrderStatus::Cancelled => stats.cancelled_orders += 1,
            }
        }
        Ok(stats)
    }
}

/// Map-backed user store
#[derive(Default)]
pub struct MemoryUsers {
    users: DashMap<Uuid, User>,
}

impl MemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUsers {
    async fn insert(&self, user: &User) -> Result<(), UserStoreError> {
        let taken = self
            .users
            .iter()
            .any(|existing| existing.username == user.username || existing.email == user.email);
        if taken {
            return Err(UserStoreError::Duplicate);
        }
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserStoreError> {
        Ok(self
            .users
            .iter()
            .find(|user| user.username == username)
            .map(|user| user.value().clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserStoreError> {
        Ok(self.users.get(&id).map(|user| user.value().clone()))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), UserStoreError> {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64, UserStoreError> {
        Ok(self.users.len() as i64)
    }
}
