//! HTTP API server with observability for the storefront backend.
//!
//! Provides REST endpoints for the catalog, cart, order workflow, stock
//! administration and customer profile, with structured logging (tracing)
//! and Prometheus metrics. Identity comes from bearer tokens verified by
//! the external identity service's interface.

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use checkout::CheckoutService;
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::IdentityVerifier;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store> {
    pub checkout: CheckoutService<S>,
    pub verifier: Arc<dyn IdentityVerifier>,
}

/// Creates the application state over a storage backend and verifier.
pub fn create_state<S: Store>(
    store: S,
    verifier: Arc<dyn IdentityVerifier>,
) -> Arc<AppState<S>> {
    Arc::new(AppState {
        checkout: CheckoutService::new(store),
        verifier,
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        // catalog
        .route("/products", get(routes::products::list::<S>))
        .route("/products/{id}", get(routes::products::get::<S>))
        .route("/admin/products", post(routes::products::create::<S>))
        .route("/admin/products/{id}", put(routes::products::update::<S>))
        // cart
        .route(
            "/cart",
            get(routes::cart::list::<S>).delete(routes::cart::clear::<S>),
        )
        .route("/cart/lines", post(routes::cart::add::<S>))
        .route(
            "/cart/lines/{id}",
            axum::routing::delete(routes::cart::remove_line::<S>),
        )
        // orders
        .route(
            "/orders",
            post(routes::orders::place::<S>).get(routes::orders::list_mine::<S>),
        )
        .route("/orders/{id}", get(routes::orders::get::<S>))
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<S>))
        .route("/admin/orders", get(routes::orders::list_all::<S>))
        .route(
            "/admin/orders/{id}/status",
            put(routes::orders::set_status::<S>),
        )
        // stock ledger (admin)
        .route(
            "/admin/stock/{product_id}",
            get(routes::stock::get::<S>).put(routes::stock::set::<S>),
        )
        .route(
            "/admin/stock/{product_id}/adjust",
            post(routes::stock::adjust::<S>),
        )
        // profile
        .route(
            "/addresses",
            post(routes::profile::create_address::<S>)
                .get(routes::profile::list_addresses::<S>),
        )
        .route(
            "/payment-methods",
            post(routes::profile::create_payment_method::<S>)
                .get(routes::profile::list_payment_methods::<S>),
        )
        .route(
            "/payment-method-types",
            get(routes::profile::list_payment_method_types::<S>),
        )
        // audit (admin)
        .route("/admin/audit", get(routes::audit::list::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
