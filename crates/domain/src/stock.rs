//! Stock ledger entities: per-product quantity with a derived level.

use common::{ProductId, StockRecordId, StockStatusId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest quantity still reported as "Bajo".
const LOW_STOCK_MAX: u32 = 5;

/// Errors raised by stock mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    /// A reservation asked for more units than are available.
    #[error("insufficient stock: requested {requested}, available {available}")]
    Insufficient { available: u32, requested: u32 },

    /// An admin adjustment would drive the quantity below zero.
    #[error("stock quantity cannot be negative (would become {0})")]
    NegativeQuantity(i64),
}

/// Stock level derived from the available quantity.
///
/// The level is a pure function of quantity and is recomputed after every
/// mutation; it is never set independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockLevel {
    /// More than five units available.
    InStock,
    /// One to five units available.
    Low,
    /// Nothing available.
    OutOfStock,
}

impl StockLevel {
    /// Derives the level for a quantity.
    pub fn for_quantity(quantity: u32) -> Self {
        match quantity {
            0 => StockLevel::OutOfStock,
            1..=LOW_STOCK_MAX => StockLevel::Low,
            _ => StockLevel::InStock,
        }
    }

    /// Returns the seeded reference-row id for this level.
    pub fn id(&self) -> StockStatusId {
        match self {
            StockLevel::InStock => StockStatusId::new(1),
            StockLevel::Low => StockStatusId::new(2),
            StockLevel::OutOfStock => StockStatusId::new(3),
        }
    }

    /// Resolves a level from its reference-row id.
    pub fn from_id(id: StockStatusId) -> Option<Self> {
        match id.as_i32() {
            1 => Some(StockLevel::InStock),
            2 => Some(StockLevel::Low),
            3 => Some(StockLevel::OutOfStock),
            _ => None,
        }
    }

    /// Returns the seeded display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            StockLevel::InStock => "En stock",
            StockLevel::Low => "Bajo",
            StockLevel::OutOfStock => "Sin stock",
        }
    }
}

impl std::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The authoritative available-quantity counter for one product.
///
/// One active record per product; created when the product is first stocked
/// and never deleted while the product exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    pub id: StockRecordId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub level: StockLevel,
}

impl StockRecord {
    /// Creates a record for a product being stocked for the first time.
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            id: StockRecordId::new(),
            product_id,
            quantity,
            level: StockLevel::for_quantity(quantity),
        }
    }

    /// Decrements the quantity for a reservation.
    ///
    /// Fails without mutating when fewer units are available than requested;
    /// the quantity can never go negative.
    pub fn reserve(&mut self, quantity: u32) -> Result<(), StockError> {
        if quantity > self.quantity {
            return Err(StockError::Insufficient {
                available: self.quantity,
                requested: quantity,
            });
        }
        self.quantity -= quantity;
        self.refresh_level();
        Ok(())
    }

    /// Increments the quantity, restoring previously reserved units.
    ///
    /// Restoring stock is always valid; there is no upper bound.
    pub fn release(&mut self, quantity: u32) {
        self.quantity += quantity;
        self.refresh_level();
    }

    /// Replaces the quantity with an absolute value (admin tool).
    pub fn set_quantity(&mut self, quantity: i64) -> Result<(), StockError> {
        let quantity =
            u32::try_from(quantity).map_err(|_| StockError::NegativeQuantity(quantity))?;
        self.quantity = quantity;
        self.refresh_level();
        Ok(())
    }

    /// Applies a relative adjustment (admin tool).
    pub fn adjust(&mut self, delta: i64) -> Result<(), StockError> {
        let result = i64::from(self.quantity) + delta;
        self.set_quantity(result)
    }

    fn refresh_level(&mut self) {
        self.level = StockLevel::for_quantity(self.quantity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(StockLevel::for_quantity(0), StockLevel::OutOfStock);
        assert_eq!(StockLevel::for_quantity(1), StockLevel::Low);
        assert_eq!(StockLevel::for_quantity(5), StockLevel::Low);
        assert_eq!(StockLevel::for_quantity(6), StockLevel::InStock);
        assert_eq!(StockLevel::for_quantity(1000), StockLevel::InStock);
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(StockLevel::OutOfStock.to_string(), "Sin stock");
        assert_eq!(StockLevel::Low.to_string(), "Bajo");
        assert_eq!(StockLevel::InStock.to_string(), "En stock");
    }

    #[test]
    fn test_level_id_roundtrip() {
        for level in [StockLevel::InStock, StockLevel::Low, StockLevel::OutOfStock] {
            assert_eq!(StockLevel::from_id(level.id()), Some(level));
        }
        assert_eq!(StockLevel::from_id(common::StockStatusId::new(99)), None);
    }

    #[test]
    fn test_new_record_derives_level() {
        let record = StockRecord::new(ProductId::new(), 3);
        assert_eq!(record.level, StockLevel::Low);
    }

    #[test]
    fn test_reserve_decrements_and_refreshes_level() {
        let mut record = StockRecord::new(ProductId::new(), 8);
        record.reserve(3).unwrap();
        assert_eq!(record.quantity, 5);
        assert_eq!(record.level, StockLevel::Low);
    }

    #[test]
    fn test_reserve_more_than_available_fails_unchanged() {
        let mut record = StockRecord::new(ProductId::new(), 2);
        let err = record.reserve(3).unwrap_err();
        assert_eq!(
            err,
            StockError::Insufficient {
                available: 2,
                requested: 3
            }
        );
        assert_eq!(record.quantity, 2);
        assert_eq!(record.level, StockLevel::Low);
    }

    #[test]
    fn test_release_has_no_upper_bound() {
        let mut record = StockRecord::new(ProductId::new(), 0);
        assert_eq!(record.level, StockLevel::OutOfStock);
        record.release(100);
        assert_eq!(record.quantity, 100);
        assert_eq!(record.level, StockLevel::InStock);
    }

    #[test]
    fn test_set_quantity_rejects_negative() {
        let mut record = StockRecord::new(ProductId::new(), 4);
        let err = record.set_quantity(-1).unwrap_err();
        assert_eq!(err, StockError::NegativeQuantity(-1));
        assert_eq!(record.quantity, 4);
    }

    #[test]
    fn test_adjust_rejects_underflow() {
        let mut record = StockRecord::new(ProductId::new(), 4);
        let err = record.adjust(-5).unwrap_err();
        assert_eq!(err, StockError::NegativeQuantity(-1));
        assert_eq!(record.quantity, 4);

        record.adjust(-4).unwrap();
        assert_eq!(record.quantity, 0);
        assert_eq!(record.level, StockLevel::OutOfStock);
    }
}
