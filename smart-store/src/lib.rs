pub mod app_config;
pub mod catalog_repo;
pub mod database;
pub mod memory;
pub mod order_repo;
pub mod user_repo;

pub use catalog_repo::PgCatalogRepository;
pub use database::DbClient;
pub use memory::{MemoryCatalog, MemoryOrders, MemoryUsers};
pub use order_repo::PgOrderRepository;
pub use user_repo::{PgUserRepository, UserRepository, UserStoreError};
