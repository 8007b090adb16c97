//! Order workflow orchestrator for the storefront backend.
//!
//! Coordinates the cart, stock ledger, order aggregate and audit recorder
//! inside single transactional units of work: place order, cancel order and
//! admin status changes, plus the admin stock tools and the simple profile
//! persistence around them.

pub mod cart;
pub mod error;
pub mod orders;
pub mod profile;
pub mod service;
pub mod stock;

pub use error::{CheckoutError, Shortfall};
pub use profile::{NewAddress, NewPaymentMethod, NewProduct, UpdateProduct};
pub use service::{
    CartEntry, CheckoutService, OrderLineView, OrderView, PlaceOrderRequest, PlacedOrder,
    StatusChangeRequest,
};
