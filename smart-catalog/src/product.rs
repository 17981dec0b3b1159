use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog record. `product_id` is assigned by the business, not the
/// store; `sku_code` is unique and normalized to uppercase on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub sku_code: String,
    pub category: String,
    pub price_per_unit_cents: i64,
    pub stock_available: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        sku_code: &str,
        category: impl Into<String>,
        price_per_unit_cents: i64,
        stock_available: i64,
    ) -> Result<Self, ProductError> {
        if price_per_unit_cents < 0 {
            return Err(ProductError::Validation(
                "pricePerUnitCents must not be negative".to_string(),
            ));
        }
        if stock_available < 0 {
            return Err(ProductError::Validation(
                "stockAvailable must not be negative".to_string(),
            ));
        }
        let sku_code = sku_code.trim().to_ascii_uppercase();
        if sku_code.is_empty() {
            return Err(ProductError::Validation("skuCode is required".to_string()));
        }
        let product_id: String = product_id.into();
        let product_id = product_id.trim().to_string();
        if product_id.is_empty() {
            return Err(ProductError::Validation("productId is required".to_string()));
        }
        let now = Utc::now();
        Ok(Self {
            product_id,
            product_name: product_name.into(),
            sku_code,
            category: category.into(),
            price_per_unit_cents,
            stock_available,
            created_at: now,
            updated_at: now,
        })
    }

    /// Whether at least one unit is on hand
    pub fn is_in_stock(&self) -> bool {
        self.stock_available > 0
    }
}

/// Catalog-related errors
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Product with this ID or SKU already exists")]
    DuplicateKey,

    #[error("{0}")]
    Validation(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Data access seam for the product catalog. Stock is mutated through the
/// [`crate::inventory::StockLedger`] during order processing; `set_stock` is
/// the administrative override that writes an absolute value.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new product; fails with `DuplicateKey` when the productId or
    /// skuCode is already taken.
    async fn insert(&self, product: &Product) -> Result<(), ProductError>;

    async fn find_by_id(&self, product_id: &str) -> Result<Option<Product>, ProductError>;

    async fn list(&self) -> Result<Vec<Product>, ProductError>;

    /// Remove a product. Historical orders are untouched; they carry their
    /// own name/price snapshots. Returns the deleted record when found.
    async fn delete(&self, product_id: &str) -> Result<Option<Product>, ProductError>;

    /// Administrative override: set `stock_available` to an absolute value,
    /// bypassing the ledger's relative add/reduce operations. Callers sit
    /// behind the admin trust boundary; `value` must already be >= 0.
    async fn set_stock(&self, product_id: &str, value: i64) -> Result<Option<Product>, ProductError>;
}
