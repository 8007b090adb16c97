//! Workflow error taxonomy.

use common::ProductId;
use serde::Serialize;
use store::StoreError;
use thiserror::Error;

/// Per-product shortfall detail carried by [`CheckoutError::InsufficientStock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Shortfall {
    pub product_id: ProductId,
    pub requested: u32,
    pub available: u32,
}

/// Errors returned by the order workflow.
///
/// Validation failures are detected before any mutation; storage failures
/// roll the whole unit of work back.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A referenced entity is absent or not owned by the caller.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Malformed input, e.g. a non-positive quantity.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A business rule of order placement was violated.
    #[error("invalid order: {0}")]
    InvalidOrder(String),

    /// One or more lines asked for more units than are available.
    ///
    /// Every offending product is listed; the check runs over all lines
    /// before any stock is touched.
    #[error("insufficient stock for {} product(s)", .0.len())]
    InsufficientStock(Vec<Shortfall>),

    /// An illegal order-status change was requested.
    #[error("order cannot change state from {from}")]
    InvalidTransition { from: String },

    /// Seeded reference data is missing; a deployment problem, not a
    /// caller error.
    #[error("missing seeded reference data: {0}")]
    MissingReference(&'static str),

    /// The storage layer failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message_counts_products() {
        let err = CheckoutError::InsufficientStock(vec![
            Shortfall {
                product_id: ProductId::new(),
                requested: 5,
                available: 3,
            },
            Shortfall {
                product_id: ProductId::new(),
                requested: 2,
                available: 0,
            },
        ]);
        assert_eq!(err.to_string(), "insufficient stock for 2 product(s)");
    }

    #[test]
    fn test_invalid_transition_names_state() {
        let err = CheckoutError::InvalidTransition {
            from: "Devuelto".to_string(),
        };
        assert_eq!(err.to_string(), "order cannot change state from Devuelto");
    }
}
