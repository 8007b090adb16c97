use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype.
///
/// Wrapping the UUID provides type safety and prevents mixing up
/// identifiers of different entities.
macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

/// Declares an i32-backed identifier newtype for reference-table rows.
///
/// Reference rows (statuses, payment-method types) are seeded with small
/// fixed ids rather than generated UUIDs.
macro_rules! ref_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates an identifier from a raw value.
            pub fn new(id: i32) -> Self {
                Self(id)
            }

            /// Returns the raw value.
            pub fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a user, issued by the identity service.
    UserId
);
uuid_id!(
    /// Unique identifier for a catalog product.
    ProductId
);
uuid_id!(
    /// Unique identifier for a stock record.
    StockRecordId
);
uuid_id!(
    /// Unique identifier for a user's cart.
    CartId
);
uuid_id!(
    /// Unique identifier for a cart line.
    CartLineId
);
uuid_id!(
    /// Unique identifier for an order.
    OrderId
);
uuid_id!(
    /// Unique identifier for an order line.
    OrderLineId
);
uuid_id!(
    /// Unique identifier for a saved address.
    AddressId
);
uuid_id!(
    /// Unique identifier for a saved payment method.
    PaymentMethodId
);
uuid_id!(
    /// Unique identifier for an audit record.
    AuditRecordId
);

ref_id!(
    /// Identifier of a fulfillment-status reference row.
    FulfillmentStatusId
);
ref_id!(
    /// Identifier of a payment-status reference row.
    PaymentStatusId
);
ref_id!(
    /// Identifier of a stock-status reference row.
    StockStatusId
);
ref_id!(
    /// Identifier of a payment-method-type reference row.
    PaymentMethodTypeId
);
