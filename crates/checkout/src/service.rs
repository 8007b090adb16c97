//! The workflow service and its request/view types.

use common::{
    AddressId, FulfillmentStatusId, Money, OrderId, PaymentMethodId, PaymentMethodTypeId,
    PaymentStatusId, ProductId,
};
use domain::{CartLine, Order, OrderLine, Product, StockRecord};
use store::{Store, UnitOfWork};

use crate::error::CheckoutError;

/// Drives the order workflow as single transactional units.
///
/// Every operation opens one unit of work, validates before mutating, and
/// commits exactly once; any early return rolls the unit back in full.
pub struct CheckoutService<S: Store> {
    store: S,
}

impl<S: Store> CheckoutService<S> {
    /// Creates a new workflow service over a storage backend.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub(crate) async fn begin(&self) -> Result<Box<dyn UnitOfWork>, CheckoutError> {
        Ok(self.store.begin().await?)
    }
}

/// Restores previously reserved units, creating the stock record if the
/// product has none yet.
pub(crate) async fn release_stock(
    uow: &mut dyn UnitOfWork,
    product_id: ProductId,
    quantity: u32,
) -> Result<(), CheckoutError> {
    let record = match uow.stock_for_update(product_id).await? {
        Some(mut record) => {
            record.release(quantity);
            record
        }
        None => StockRecord::new(product_id, quantity),
    };
    uow.upsert_stock(&record).await?;
    Ok(())
}

/// Input for placing an order from the caller's cart.
#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
    pub address_id: AddressId,
    pub payment_method_id: Option<PaymentMethodId>,
    pub payment_method_type_id: Option<PaymentMethodTypeId>,
}

/// Summary returned after a successful placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub total: Money,
}

/// Admin request to move an order's status references.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusChangeRequest {
    pub fulfillment_status_id: Option<FulfillmentStatusId>,
    pub payment_status_id: Option<PaymentStatusId>,
}

/// One cart line together with its product snapshot.
#[derive(Debug, Clone)]
pub struct CartEntry {
    pub line: CartLine,
    pub product: Product,
}

/// One order line with the product as currently known to the catalog.
///
/// The product may have been removed since the purchase; the line itself
/// keeps the historical quantity and unit price either way.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub line: OrderLine,
    pub product: Option<Product>,
}

/// An order with resolved status names and its lines.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: Order,
    pub fulfillment_status: String,
    pub payment_status: String,
    pub lines: Vec<OrderLineView>,
}

pub(crate) async fn order_view(
    uow: &mut dyn UnitOfWork,
    order: Order,
) -> Result<OrderView, CheckoutError> {
    let fulfillment = uow
        .fulfillment_status(order.fulfillment_status_id)
        .await?
        .ok_or(CheckoutError::MissingReference("fulfillment status"))?;
    let payment = uow
        .payment_status(order.payment_status_id)
        .await?
        .ok_or(CheckoutError::MissingReference("payment status"))?;

    let mut lines = Vec::new();
    for line in uow.order_lines(order.id).await? {
        let product = uow.product(line.product_id).await?;
        lines.push(OrderLineView { line, product });
    }

    Ok(OrderView {
        order,
        fulfillment_status: fulfillment.name,
        payment_status: payment.name,
        lines,
    })
}
