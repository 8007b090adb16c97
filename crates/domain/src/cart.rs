//! Shopping cart entities.

use common::{CartId, CartLineId, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// A user's shopping cart, created lazily on the first add.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
}

impl Cart {
    /// Creates a cart for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: CartId::new(),
            user_id,
        }
    }
}

/// One (product, quantity) entry in a cart.
///
/// At most one line exists per (cart, product) pair; repeated adds merge
/// into the existing line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CartLine {
    /// Creates a new cart line.
    pub fn new(cart_id: CartId, product_id: ProductId, quantity: u32) -> Self {
        Self {
            id: CartLineId::new(),
            cart_id,
            product_id,
            quantity,
        }
    }

    /// Merges an additional quantity into this line.
    pub fn merge(&mut self, additional: u32) {
        self.quantity += additional;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_accumulates_quantity() {
        let mut line = CartLine::new(CartId::new(), ProductId::new(), 2);
        line.merge(3);
        assert_eq!(line.quantity, 5);
    }
}
