//! Order status reference data.
//!
//! Fulfillment and payment statuses are configuration-defined reference rows
//! seeded by the migrations. The workflow only needs two classifications,
//! both derived from the status name: whether a fulfillment status is
//! annulled (reserved stock has been released) and whether a client may
//! still cancel from it.

use common::{FulfillmentStatusId, PaymentStatusId};
use serde::{Deserialize, Serialize};

/// Seeded status label constants.
pub mod status_names {
    pub const PENDIENTE: &str = "Pendiente";
    pub const CONFIRMADO: &str = "Confirmado";
    pub const ENVIADO: &str = "Enviado";
    pub const ENTREGADO: &str = "Entregado";
    pub const CANCELADO: &str = "Cancelado";
    pub const DEVUELTO: &str = "Devuelto";
    pub const PAGADO: &str = "Pagado";
    pub const REEMBOLSADO: &str = "Reembolsado";
}

/// A fulfillment-status reference row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentStatus {
    pub id: FulfillmentStatusId,
    pub name: String,
}

impl FulfillmentStatus {
    /// Returns true if this status implies reserved stock has been released
    /// back to the ledger.
    pub fn is_annulled(&self) -> bool {
        self.name == status_names::CANCELADO || self.name == status_names::DEVUELTO
    }

    /// Returns true if a client-initiated cancellation is permitted from
    /// this status.
    pub fn allows_client_cancel(&self) -> bool {
        self.name == status_names::PENDIENTE || self.name == status_names::CONFIRMADO
    }
}

impl std::fmt::Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A payment-status reference row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub id: PaymentStatusId,
    pub name: String,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(name: &str) -> FulfillmentStatus {
        FulfillmentStatus {
            id: FulfillmentStatusId::new(1),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_annulled_classification() {
        assert!(status("Cancelado").is_annulled());
        assert!(status("Devuelto").is_annulled());
        assert!(!status("Pendiente").is_annulled());
        assert!(!status("Confirmado").is_annulled());
        assert!(!status("Enviado").is_annulled());
        assert!(!status("Entregado").is_annulled());
    }

    #[test]
    fn test_client_cancel_window() {
        assert!(status("Pendiente").allows_client_cancel());
        assert!(status("Confirmado").allows_client_cancel());
        assert!(!status("Enviado").allows_client_cancel());
        assert!(!status("Entregado").allows_client_cancel());
        assert!(!status("Cancelado").allows_client_cancel());
        assert!(!status("Devuelto").allows_client_cancel());
    }
}
