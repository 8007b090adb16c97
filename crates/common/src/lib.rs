//! Shared identifiers and value types used across the storefront crates.

pub mod ids;
pub mod money;
pub mod role;

pub use ids::{
    AddressId, AuditRecordId, CartId, CartLineId, FulfillmentStatusId, OrderId, OrderLineId,
    PaymentMethodId, PaymentMethodTypeId, PaymentStatusId, ProductId, StockRecordId,
    StockStatusId, UserId,
};
pub use money::Money;
pub use role::Role;
