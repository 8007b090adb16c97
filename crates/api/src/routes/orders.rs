//! Order endpoints: placement, lookup and cancellation for clients,
//! listings and status transitions for admins.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::{OrderView, PlaceOrderRequest, StatusChangeRequest};
use chrono::{DateTime, Utc};
use common::{
    AddressId, FulfillmentStatusId, OrderId, PaymentMethodId, PaymentMethodTypeId,
    PaymentStatusId,
};
use serde::{Deserialize, Serialize};
use store::Store;
use uuid::Uuid;

use crate::AppState;
use crate::auth::{AdminUser, ClientUser};
use crate::error::ApiError;

// -- Request types --

#[derive(Deserialize)]
pub struct PlaceOrderBody {
    pub address_id: Uuid,
    pub payment_method_id: Option<Uuid>,
    pub payment_method_type_id: Option<i32>,
}

#[derive(Deserialize, Default)]
pub struct SetStatusBody {
    pub fulfillment_status_id: Option<i32>,
    pub payment_status_id: Option<i32>,
}

// -- Response types --

#[derive(Serialize)]
pub struct PlacedOrderResponse {
    pub order_id: Uuid,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct OrderLineResponse {
    pub product_id: Uuid,
    pub product_name: Option<String>,
    pub brand: Option<String>,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub total_cents: i64,
    pub fulfillment_status: String,
    pub payment_status: String,
    pub lines: Vec<OrderLineResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(view: OrderView) -> Self {
        let lines = view
            .lines
            .into_iter()
            .map(|line_view| {
                let (product_name, brand) = match line_view.product {
                    Some(product) => (Some(product.name), product.brand),
                    None => (None, None),
                };
                OrderLineResponse {
                    product_id: line_view.line.product_id.as_uuid(),
                    product_name,
                    brand,
                    quantity: line_view.line.quantity,
                    unit_price_cents: line_view.line.unit_price.cents(),
                    subtotal_cents: line_view.line.subtotal().cents(),
                }
            })
            .collect();

        Self {
            id: view.order.id.as_uuid(),
            user_id: view.order.user_id.as_uuid(),
            created_at: view.order.created_at,
            total_cents: view.order.total.cents(),
            fulfillment_status: view.fulfillment_status,
            payment_status: view.payment_status,
            lines,
        }
    }
}

// -- Handlers --

/// POST /orders — place an order from the caller's cart.
#[tracing::instrument(skip(state, req))]
pub async fn place<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientUser(identity): ClientUser,
    Json(req): Json<PlaceOrderBody>,
) -> Result<(StatusCode, Json<PlacedOrderResponse>), ApiError> {
    let placed = state
        .checkout
        .place_order(
            identity.user_id,
            PlaceOrderRequest {
                address_id: AddressId::from_uuid(req.address_id),
                payment_method_id: req.payment_method_id.map(PaymentMethodId::from_uuid),
                payment_method_type_id: req.payment_method_type_id.map(PaymentMethodTypeId::new),
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PlacedOrderResponse {
            order_id: placed.order_id.as_uuid(),
            total_cents: placed.total.cents(),
        }),
    ))
}

/// GET /orders — list the caller's orders, newest first.
#[tracing::instrument(skip(state))]
pub async fn list_mine<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientUser(identity): ClientUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let views = state.checkout.list_my_orders(identity.user_id).await?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

/// GET /orders/{id} — one of the caller's orders.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientUser(identity): ClientUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, ApiError> {
    let view = state
        .checkout
        .get_order(identity.user_id, OrderId::from_uuid(id))
        .await?;
    Ok(Json(view.into()))
}

/// POST /orders/{id}/cancel — cancel the caller's order.
#[tracing::instrument(skip(state))]
pub async fn cancel<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientUser(identity): ClientUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .checkout
        .cancel_order(identity.user_id, OrderId::from_uuid(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /admin/orders — list every order.
#[tracing::instrument(skip(state))]
pub async fn list_all<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _admin: AdminUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let views = state.checkout.list_all_orders().await?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

/// PUT /admin/orders/{id}/status — move an order's statuses.
#[tracing::instrument(skip(state, req))]
pub async fn set_status<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    AdminUser(identity): AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusBody>,
) -> Result<StatusCode, ApiError> {
    state
        .checkout
        .admin_set_status(
            identity.user_id,
            OrderId::from_uuid(id),
            StatusChangeRequest {
                fulfillment_status_id: req.fulfillment_status_id.map(FulfillmentStatusId::new),
                payment_status_id: req.payment_status_id.map(PaymentStatusId::new),
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
