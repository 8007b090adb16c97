//! Append-only audit trail records.

use chrono::{DateTime, Utc};
use common::{AuditRecordId, UserId};
use serde::{Deserialize, Serialize};

/// One immutable audit entry describing a stock-impacting change.
///
/// Records are only ever appended; the core never mutates or deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: AuditRecordId,
    pub user_id: Option<UserId>,
    pub recorded_at: DateTime<Utc>,
    pub action: String,
    pub affected_entity: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl AuditRecord {
    /// Creates an audit entry.
    pub fn new(
        user_id: Option<UserId>,
        recorded_at: DateTime<Utc>,
        action: impl Into<String>,
        affected_entity: impl Into<String>,
        old_value: Option<String>,
        new_value: Option<String>,
    ) -> Self {
        Self {
            id: AuditRecordId::new(),
            user_id,
            recorded_at,
            action: action.into(),
            affected_entity: affected_entity.into(),
            old_value,
            new_value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_captures_values() {
        let user = UserId::new();
        let record = AuditRecord::new(
            Some(user),
            Utc::now(),
            "Cambio de estado de pedido",
            "orders",
            Some("Pendiente".to_string()),
            Some("Cancelado".to_string()),
        );
        assert_eq!(record.user_id, Some(user));
        assert_eq!(record.affected_entity, "orders");
        assert_eq!(record.old_value.as_deref(), Some("Pendiente"));
        assert_eq!(record.new_value.as_deref(), Some("Cancelado"));
    }
}
