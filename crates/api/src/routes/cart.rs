//! Cart endpoints (Cliente role).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::CheckoutError;
use common::{CartLineId, ProductId};
use serde::{Deserialize, Serialize};
use store::Store;
use uuid::Uuid;

use crate::AppState;
use crate::auth::ClientUser;
use crate::error::ApiError;
use crate::routes::products::ProductResponse;

#[derive(Deserialize)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    pub quantity: i64,
}

#[derive(Serialize)]
pub struct CartLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Serialize)]
pub struct CartEntryResponse {
    pub id: Uuid,
    pub product: ProductResponse,
    pub quantity: u32,
}

/// POST /cart/lines — add a product to the caller's cart.
#[tracing::instrument(skip(state, req))]
pub async fn add<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientUser(identity): ClientUser,
    Json(req): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartLineResponse>), ApiError> {
    let quantity = u32::try_from(req.quantity)
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| {
            ApiError::from(CheckoutError::InvalidArgument(
                "quantity must be a positive integer".to_string(),
            ))
        })?;

    let line = state
        .checkout
        .add_to_cart(
            identity.user_id,
            ProductId::from_uuid(req.product_id),
            quantity,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CartLineResponse {
            id: line.id.as_uuid(),
            product_id: line.product_id.as_uuid(),
            quantity: line.quantity,
        }),
    ))
}

/// GET /cart — list the caller's cart with product snapshots.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientUser(identity): ClientUser,
) -> Result<Json<Vec<CartEntryResponse>>, ApiError> {
    let entries = state.checkout.list_cart(identity.user_id).await?;
    let responses = entries
        .into_iter()
        .map(|entry| CartEntryResponse {
            id: entry.line.id.as_uuid(),
            product: entry.product.into(),
            quantity: entry.line.quantity,
        })
        .collect();
    Ok(Json(responses))
}

/// DELETE /cart/lines/{id} — remove one line from the caller's cart.
#[tracing::instrument(skip(state))]
pub async fn remove_line<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientUser(identity): ClientUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .checkout
        .remove_cart_line(identity.user_id, CartLineId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /cart — empty the caller's cart.
#[tracing::instrument(skip(state))]
pub async fn clear<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientUser(identity): ClientUser,
) -> Result<StatusCode, ApiError> {
    state.checkout.clear_cart(identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
