pub mod lifecycle;
pub mod models;
pub mod orchestrator;
pub mod repository;

pub use lifecycle::OrderError;
pub use models::{CustomerInfo, Order, OrderItem, OrderStats, OrderStatus};
pub use orchestrator::{OrderItemRequest, OrderOrchestrator};
pub use repository::OrderRepository;
