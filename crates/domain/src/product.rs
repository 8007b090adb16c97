//! Catalog product record.

use chrono::{DateTime, Utc};
use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A catalog product.
///
/// The order workflow treats the catalog as read-only: it reads the price at
/// purchase time and never mutates product fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub price: Money,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Creates a new catalog product.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        brand: Option<String>,
        price: Money,
        category: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            description,
            brand,
            price,
            category,
            created_at,
        }
    }
}
