use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smart_shared::pii::Masked;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Order status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled are terminal; no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(other.to_string()),
        }
    }
}

/// Contact details captured with the order. Email and phone are masked in
/// Debug output so they cannot leak through log macros.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub name: String,
    pub email: Masked<String>,
    pub phone: Masked<String>,
}

/// A line within an order. Name and price are snapshots taken at
/// order-creation time; later catalog edits never alter them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub price_per_unit_cents: i64,
    pub total_price_cents: i64,
}

impl OrderItem {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        quantity: i64,
        price_per_unit_cents: i64,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            price_per_unit_cents,
            total_price_cents: quantity * price_per_unit_cents,
        }
    }
}

/// The record of a customer's purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub total_amount_cents: i64,
    pub customer_info: CustomerInfo,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a pending order. The total is derived from the items here and
    /// re-derived whenever items are written, never accepted from a caller.
    pub fn new(items: Vec<OrderItem>, customer_info: CustomerInfo) -> Self {
        let now = Utc::now();
        let mut order = Self {
            order_id: Uuid::new_v4(),
            order_date: now,
            items,
            status: OrderStatus::Pending,
            total_amount_cents: 0,
            customer_info,
            updated_at: now,
        };
        order.recompute_total();
        order
    }

    pub fn recompute_total(&mut self) {
        self.total_amount_cents = self.total_from_items();
    }

    pub fn total_from_items(&self) -> i64 {
        self.items.iter().map(|item| item.total_price_cents).sum()
    }

    pub fn total_items(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// Aggregate order counts and completed-order revenue
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub completed_orders: i64,
    pub cancelled_orders: i64,
    pub total_revenue_cents: i64,
}
