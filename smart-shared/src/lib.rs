pub mod models;
pub mod pii;

pub use models::user::{Role, User};
pub use pii::Masked;
