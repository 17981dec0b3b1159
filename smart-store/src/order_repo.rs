use async_trait::async_trait;
use chrono::{DateTime, Utc};
use smart_order::lifecycle::OrderError;
use smart_order::models::{CustomerInfo, Order, OrderItem, OrderStats, OrderStatus};
use smart_order::repository::OrderRepository;
use smart_shared::pii::Masked;
use sqlx::PgPool;
use uuid::Uuid;

use crate::catalog_repo::is_unique_violation;

pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, OrderError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT product_id, product_name, quantity, price_per_unit_cents, total_price_cents
            FROM order_items WHERE order_id = $1 ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: Uuid,
    order_date: DateTime<Utc>,
    status: String,
    total_amount_cents: i64,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    product_id: String,
    product_name: String,
    quantity: i64,
    price_per_unit_cents: i64,
    total_price_cents: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            price_per_unit_cents: row.price_per_unit_cents,
            total_price_cents: row.total_price_cents,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    total_orders: i64,
    pending_orders: i64,
    completed_orders: i64,
    cancelled_orders: i64,
    total_revenue_cents: i64,
}

fn assemble(row: OrderRow, items: Vec<OrderItem>) -> Result<Order, OrderError> {
    let status = row
        .status
        .parse::<OrderStatus>()
        .map_err(|bad| OrderError::Storage(format!("corrupt order status: {}", bad)))?;

    Ok(Order {
        order_id: row.order_id,
        order_date: row.order_date,
        items,
        status,
        total_amount_cents: row.total_amount_cents,
        customer_info: CustomerInfo {
            name: row.customer_name,
            email: Masked(row.customer_email),
            phone: Masked(row.customer_phone),
        },
        updated_at: row.updated_at,
    })
}

const ORDER_COLUMNS: &str = "order_id, order_date, status, total_amount_cents, customer_name, customer_email, customer_phone, updated_at";

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), OrderError> {
        let mut tx = self.pool.begin().await.map_err(storage)?;

        sqlx::query(
            r#"
            INSERT INTO orders (order_id, order_date, status, total_amount_cents, customer_name, customer_email, customer_phone, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(order.order_id)
        .bind(order.order_date)
        .bind(order.status.as_str())
        .bind(order.total_amount_cents)
        .bind(&order.customer_info.name)
        .bind(order.customer_info.email.as_inner())
        .bind(order.customer_info.phone.as_inner())
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                OrderError::DuplicateOrder(order.order_id)
            } else {
                storage(err)
            }
        })?;

        for item in &order.items {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, product_name, quantity, price_per_unit_cents, total_price_cents)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(order.order_id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.price_per_unit_cents)
            .bind(item.total_price_cents)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        }

        tx.commit().await.map_err(storage)?;

        Ok(())
    }

    async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        match row {
            Some(row) => {
                let items = self.load_items(order_id).await?;
                Ok(Some(assemble(row, items)?))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, OrderError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE status = $1 ORDER BY order_date DESC"
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders ORDER BY order_date DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(storage)?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.load_items(row.order_id).await?;
            orders.push(assemble(row, items)?);
        }
        Ok(orders)
    }

    async fn update_status(&self, order_id: Uuid, status: OrderStatus) -> Result<(), OrderError> {
        let result = sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE order_id = $1")
            .bind(order_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage)?;

        if result.rows_affected() == 0 {
            return Err(OrderError::NotFound(order_id));
        }
        Ok(())
    }

    async fn delete(&self, order_id: Uuid) -> Result<Option<Order>, OrderError> {
        let existing = self.find_by_id(order_id).await?;
        if existing.is_some() {
            // order_items rows go with the order via ON DELETE CASCADE
            sqlx::query("DELETE FROM orders WHERE order_id = $1")
                .bind(order_id)
                .execute(&self.pool)
                .await
                .map_err(storage)?;
        }
        Ok(existing)
    }

    async fn stats(&self) -> Result<OrderStats, OrderError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT COUNT(*)                                                        AS total_orders,
                   COUNT(*) FILTER (WHERE status = 'pending')                      AS pending_orders,
                   COUNT(*) FILTER (WHERE status = 'completed')                    AS completed_orders,
                   COUNT(*) FILTER (WHERE status = 'cancelled')                    AS cancelled_orders,
                   COALESCE(SUM(total_amount_cents) FILTER (WHERE status = 'completed'), 0)::BIGINT
                                                                                   AS total_revenue_cents
            FROM orders
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(storage)?;

        Ok(OrderStats {
            total_orders: row.total_orders,
            pending_orders: row.pending_orders,
            completed_orders: row.completed_orders,
            cancelled_orders: row.cancelled_orders,
            total_revenue_cents: row.total_revenue_cents,
        })
    }
}

fn storage(err: sqlx::Error) -> OrderError {
    OrderError::Storage(err.to_string())
}
