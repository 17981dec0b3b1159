use async_trait::async_trait;
use chrono::{DateTime, Utc};
use smart_catalog::inventory::{InventoryError, StockLedger};
use smart_catalog::product::{Product, ProductError, ProductRepository};
use sqlx::PgPool;

pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct ProductRow {
    product_id: String,
    product_name: String,
    sku_code: String,
    category: String,
    price_per_unit_cents: i64,
    stock_available: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            product_id: row.product_id,
            product_name: row.product_name,
            sku_code: row.sku_code,
            category: row.category,
            price_per_unit_cents: row.price_per_unit_cents,
            stock_available: row.stock_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const PRODUCT_COLUMNS: &str =
    "product_id, product_name, sku_code, category, price_per_unit_cents, stock_available, created_at, updated_at";

#[async_trait]
impl ProductRepository for PgCatalogRepository {
    async fn insert(&self, product: &Product) -> Result<(), ProductError> {
        sqlx::query(
            r#"
            INSERT INTO products (product_id, product_name, sku_code, category, price_per_unit_cents, stock_available, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&product.product_id)
        .bind(&product.product_name)
        .bind(&product.sku_code)
        .bind(&product.category)
        .bind(product.price_per_unit_cents)
        .bind(product.stock_available)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                ProductError::DuplicateKey
            } else {
                ProductError::Backend(err.to_string())
            }
        })?;

        Ok(())
    }

    async fn find_by_id(&self, product_id: &str) -> Result<Option<Product>, ProductError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1"
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Product::from))
    }

    async fn list(&self) -> Result<Vec<Product>, ProductError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY product_name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn delete(&self, product_id: &str) -> Result<Option<Product>, ProductError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "DELETE FROM products WHERE product_id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Product::from))
    }

    async fn set_stock(&self, product_id: &str, value: i64) -> Result<Option<Product>, ProductError> {
        if value < 0 {
            return Err(ProductError::Validation(
                "stockAvailable must not be negative".to_string(),
            ));
        }
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products SET stock_available = $2, updated_at = NOW() WHERE product_id = $1 RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(product_id)
        .bind(value)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        Ok(row.map(Product::from))
    }
}

#[async_trait]
impl StockLedger for PgCatalogRepository {
    async fn reduce(&self, product_id: &str, quantity: i64) -> Result<i64, InventoryError> {
        if quantity < 0 {
            return Err(InventoryError::InvalidQuantity(quantity));
        }

        // Guarded update: the availability check and the decrement are one
        // statement, so concurrent callers cannot jointly overdraw.
        let updated: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE products
            SET stock_available = stock_available - $2, updated_at = NOW()
            WHERE product_id = $1 AND stock_available >= $2
            RETURNING stock_available
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(inventory_backend)?;

        if let Some((stock,)) = updated {
            return Ok(stock);
        }

        // Guard refused: missing product or not enough stock. The re-read is
        // informational only; the guard above stays authoritative.
        let available: Option<(i64,)> =
            sqlx::query_as("SELECT stock_available FROM products WHERE product_id = $1")
                .bind(product_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(inventory_backend)?;

        match available {
            Some((available,)) => Err(InventoryError::InsufficientStock {
                product_id: product_id.to_string(),
                requested: quantity,
                available,
            }),
            None => Err(InventoryError::NotFound(product_id.to_string())),
        }
    }

    async fn add(&self, product_id: &str, quantity: i64) -> Result<i64, InventoryError> {
        if quantity < 0 {
            return Err(InventoryError::InvalidQuantity(quantity));
        }

        let updated: Option<(i64,)> = sqlx::query_as(
            r#"
            UPDATE products
            SET stock_available = stock_available + $2, updated_at = NOW()
            WHERE product_id = $1
            RETURNING stock_available
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(inventory_backend)?;

        match updated {
            Some((stock,)) => Ok(stock),
            None => Err(InventoryError::NotFound(product_id.to_string())),
        }
    }
}

fn backend(err: sqlx::Error) -> ProductError {
    ProductError::Backend(err.to_string())
}

fn inventory_backend(err: sqlx::Error) -> InventoryError {
    InventoryError::Backend(err.to_string())
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
