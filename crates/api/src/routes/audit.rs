//! Admin audit-trail readout.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::{DateTime, Utc};
use domain::AuditRecord;
use serde::Serialize;
use store::Store;
use uuid::Uuid;

use crate::AppState;
use crate::auth::AdminUser;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct AuditResponse {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub recorded_at: DateTime<Utc>,
    pub action: String,
    pub affected_entity: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl From<AuditRecord> for AuditResponse {
    fn from(record: AuditRecord) -> Self {
        Self {
            id: record.id.as_uuid(),
            user_id: record.user_id.map(|id| id.as_uuid()),
            recorded_at: record.recorded_at,
            action: record.action,
            affected_entity: record.affected_entity,
            old_value: record.old_value,
            new_value: record.new_value,
        }
    }
}

/// GET /admin/audit — list audit records, newest first.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _admin: AdminUser,
) -> Result<Json<Vec<AuditResponse>>, ApiError> {
    let records = state.checkout.audit_trail().await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}
