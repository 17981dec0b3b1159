use crate::models::OrderStatus;
use uuid::Uuid;

/// Check a lifecycle transition: `pending` may move to `completed` or
/// `cancelled` exactly once; both of those are terminal.
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
    match (from, to) {
        (OrderStatus::Pending, OrderStatus::Completed)
        | (OrderStatus::Pending, OrderStatus::Cancelled) => Ok(()),
        _ => Err(OrderError::InvalidTransition { from, to }),
    }
}

/// Errors surfaced by the order workflow
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Product with ID {0} not found")]
    ProductNotFound(String),

    #[error("Insufficient stock for product {product_name}. Available: {available}, Requested: {requested}")]
    InsufficientStock {
        product_name: String,
        available: i64,
        requested: i64,
    },

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Cannot cancel a {0} order")]
    CancelRejected(OrderStatus),

    #[error("Invalid status. Must be pending, completed, or cancelled")]
    InvalidStatus(String),

    #[error("Order with ID {0} already exists")]
    DuplicateOrder(Uuid),

    #[error("{0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_reaches_both_terminal_states() {
        assert!(check_transition(OrderStatus::Pending, OrderStatus::Completed).is_ok());
        assert!(check_transition(OrderStatus::Pending, OrderStatus::Cancelled).is_ok());
    }

    #[test]
    fn terminal_states_reject_everything() {
        for from in [OrderStatus::Completed, OrderStatus::Cancelled] {
            for to in [OrderStatus::Pending, OrderStatus::Completed, OrderStatus::Cancelled] {
                let err = check_transition(from, to).unwrap_err();
                assert!(matches!(err, OrderError::InvalidTransition { .. }));
            }
        }
    }

    #[test]
    fn self_transition_from_pending_is_rejected() {
        assert!(check_transition(OrderStatus::Pending, OrderStatus::Pending).is_err());
    }

    #[test]
    fn insufficient_stock_message_names_counts() {
        let err = OrderError::InsufficientStock {
            product_name: "Rice 5kg".to_string(),
            available: 0,
            requested: 1,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product Rice 5kg. Available: 0, Requested: 1"
        );
    }
}
