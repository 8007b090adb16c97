//! Saved addresses and payment methods (Cliente role), plus the public
//! payment-method-type lookup.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use checkout::{NewAddress, NewPaymentMethod};
use common::PaymentMethodTypeId;
use domain::{Address, PaymentMethodType, SavedPaymentMethod};
use serde::{Deserialize, Serialize};
use store::Store;
use uuid::Uuid;

use crate::AppState;
use crate::auth::ClientUser;
use crate::error::ApiError;

// -- addresses --

#[derive(Deserialize, Default)]
pub struct CreateAddressRequest {
    pub province: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Serialize)]
pub struct AddressResponse {
    pub id: Uuid,
    pub province: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub number: Option<String>,
    pub postal_code: Option<String>,
}

impl From<Address> for AddressResponse {
    fn from(address: Address) -> Self {
        Self {
            id: address.id.as_uuid(),
            province: address.province,
            city: address.city,
            street: address.street,
            number: address.number,
            postal_code: address.postal_code,
        }
    }
}

/// POST /addresses — save an address for the caller.
#[tracing::instrument(skip(state, req))]
pub async fn create_address<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientUser(identity): ClientUser,
    Json(req): Json<CreateAddressRequest>,
) -> Result<(StatusCode, Json<AddressResponse>), ApiError> {
    let address = state
        .checkout
        .create_address(
            identity.user_id,
            NewAddress {
                province: req.province,
                city: req.city,
                street: req.street,
                number: req.number,
                postal_code: req.postal_code,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(address.into())))
}

/// GET /addresses — the caller's saved addresses.
#[tracing::instrument(skip(state))]
pub async fn list_addresses<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientUser(identity): ClientUser,
) -> Result<Json<Vec<AddressResponse>>, ApiError> {
    let addresses = state.checkout.list_addresses(identity.user_id).await?;
    Ok(Json(addresses.into_iter().map(Into::into).collect()))
}

// -- payment methods --

#[derive(Deserialize)]
pub struct CreatePaymentMethodRequest {
    pub type_id: i32,
    pub holder: Option<String>,
    pub last4: Option<String>,
    pub expiry: Option<String>,
}

#[derive(Serialize)]
pub struct PaymentMethodResponse {
    pub id: Uuid,
    pub type_id: i32,
    pub holder: Option<String>,
    pub last4: Option<String>,
    pub expiry: Option<String>,
}

impl From<SavedPaymentMethod> for PaymentMethodResponse {
    fn from(method: SavedPaymentMethod) -> Self {
        Self {
            id: method.id.as_uuid(),
            type_id: method.type_id.as_i32(),
            holder: method.holder,
            last4: method.last4,
            expiry: method.expiry,
        }
    }
}

#[derive(Serialize)]
pub struct PaymentMethodTypeResponse {
    pub id: i32,
    pub name: String,
}

impl From<PaymentMethodType> for PaymentMethodTypeResponse {
    fn from(kind: PaymentMethodType) -> Self {
        Self {
            id: kind.id.as_i32(),
            name: kind.name,
        }
    }
}

/// POST /payment-methods — save a payment method for the caller.
#[tracing::instrument(skip(state, req))]
pub async fn create_payment_method<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientUser(identity): ClientUser,
    Json(req): Json<CreatePaymentMethodRequest>,
) -> Result<(StatusCode, Json<PaymentMethodResponse>), ApiError> {
    let method = state
        .checkout
        .create_payment_method(
            identity.user_id,
            NewPaymentMethod {
                type_id: PaymentMethodTypeId::new(req.type_id),
                holder: req.holder,
                last4: req.last4,
                expiry: req.expiry,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(method.into())))
}

/// GET /payment-methods — the caller's saved payment methods.
#[tracing::instrument(skip(state))]
pub async fn list_payment_methods<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    ClientUser(identity): ClientUser,
) -> Result<Json<Vec<PaymentMethodResponse>>, ApiError> {
    let methods = state.checkout.list_payment_methods(identity.user_id).await?;
    Ok(Json(methods.into_iter().map(Into::into).collect()))
}

/// GET /payment-method-types — the seeded payment-method types.
#[tracing::instrument(skip(state))]
pub async fn list_payment_method_types<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<PaymentMethodTypeResponse>>, ApiError> {
    let types = state.checkout.list_payment_method_types().await?;
    Ok(Json(types.into_iter().map(Into::into).collect()))
}
