//! Admin stock-ledger endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::ProductId;
use domain::StockRecord;
use serde::{Deserialize, Serialize};
use store::Store;
use uuid::Uuid;

use crate::AppState;
use crate::auth::AdminUser;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct StockResponse {
    pub product_id: Uuid,
    pub quantity: u32,
    pub status: &'static str,
}

impl From<StockRecord> for StockResponse {
    fn from(record: StockRecord) -> Self {
        Self {
            product_id: record.product_id.as_uuid(),
            quantity: record.quantity,
            status: record.level.as_str(),
        }
    }
}

#[derive(Deserialize)]
pub struct SetStockRequest {
    pub quantity: i64,
}

#[derive(Deserialize)]
pub struct AdjustStockRequest {
    pub delta: i64,
}

/// GET /admin/stock/{product_id} — current quantity and level.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _admin: AdminUser,
    Path(product_id): Path<Uuid>,
) -> Result<Json<StockResponse>, ApiError> {
    let record = state
        .checkout
        .stock_level(ProductId::from_uuid(product_id))
        .await?;
    Ok(Json(record.into()))
}

/// PUT /admin/stock/{product_id} — set an absolute quantity.
#[tracing::instrument(skip(state, req))]
pub async fn set<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(identity): AdminUser,
    Path(product_id): Path<Uuid>,
    Json(req): Json<SetStockRequest>,
) -> Result<Json<StockResponse>, ApiError> {
    let record = state
        .checkout
        .set_stock(identity.user_id, ProductId::from_uuid(product_id), req.quantity)
        .await?;
    Ok(Json(record.into()))
}

/// POST /admin/stock/{product_id}/adjust — apply a signed delta.
#[tracing::instrument(skip(state, req))]
pub async fn adjust<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(identity): AdminUser,
    Path(product_id): Path<Uuid>,
    Json(req): Json<AdjustStockRequest>,
) -> Result<Json<StockResponse>, ApiError> {
    let record = state
        .checkout
        .adjust_stock(identity.user_id, ProductId::from_uuid(product_id), req.delta)
        .await?;
    Ok(Json(record.into()))
}
