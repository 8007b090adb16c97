//! Customer profile records: saved addresses and payment methods.
//!
//! "Payment method" is a labeled reference only; no gateway is integrated.

use common::{AddressId, PaymentMethodId, PaymentMethodTypeId, UserId};
use serde::{Deserialize, Serialize};

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub province: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub postal_code: Option<String>,
}

/// A payment-method type reference row (Efectivo, Tarjeta, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodType {
    pub id: PaymentMethodTypeId,
    pub name: String,
}

/// A payment method saved by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPaymentMethod {
    pub id: PaymentMethodId,
    pub user_id: UserId,
    pub type_id: PaymentMethodTypeId,
    pub holder: Option<String>,
    pub last4: Option<String>,
    pub expiry: Option<String>,
}
