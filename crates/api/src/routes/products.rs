//! Catalog endpoints: public reads plus admin create/update.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use checkout::{NewProduct, UpdateProduct};
use common::{Money, ProductId};
use domain::Product;
use serde::{Deserialize, Serialize};
use store::Store;
use uuid::Uuid;

use crate::AppState;
use crate::auth::AdminUser;
use crate::error::ApiError;

#[derive(Serialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub price_cents: i64,
    pub category: Option<String>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.as_uuid(),
            name: product.name,
            description: product.description,
            brand: product.brand,
            price_cents: product.price.cents(),
            category: product.category,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub price_cents: i64,
    pub category: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub price_cents: Option<i64>,
    pub category: Option<String>,
}

/// GET /products — list the catalog.
#[tracing::instrument(skip(state))]
pub async fn list<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ProductResponse>>, ApiError> {
    let products = state.checkout.list_products().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// GET /products/{id} — one product.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state.checkout.get_product(ProductId::from_uuid(id)).await?;
    Ok(Json(product.into()))
}

/// POST /admin/products — create a product.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _admin: AdminUser,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), ApiError> {
    let product = state
        .checkout
        .create_product(NewProduct {
            name: req.name,
            description: req.description,
            brand: req.brand,
            price: Money::from_cents(req.price_cents),
            category: req.category,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// PUT /admin/products/{id} — update a product's fields.
#[tracing::instrument(skip(state, req))]
pub async fn update<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductResponse>, ApiError> {
    let product = state
        .checkout
        .update_product(
            ProductId::from_uuid(id),
            UpdateProduct {
                name: req.name,
                description: req.description,
                brand: req.brand,
                price: req.price_cents.map(Money::from_cents),
                category: req.category,
            },
        )
        .await?;
    Ok(Json(product.into()))
}
