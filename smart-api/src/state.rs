use smart_catalog::inventory::StockLedger;
use smart_catalog::product::ProductRepository;
use smart_order::orchestrator::OrderOrchestrator;
use smart_order::repository::OrderRepository;
use smart_store::UserRepository;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration_seconds: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub ledger: Arc<dyn StockLedger>,
    pub orders: Arc<dyn OrderRepository>,
    pub users: Arc<dyn UserRepository>,
    pub orchestrator: Arc<OrderOrchestrator>,
    pub auth: AuthConfig,
    pub started_at: Instant,
}
