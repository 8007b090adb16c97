use async_trait::async_trait;
use common::{
    AddressId, CartId, CartLineId, FulfillmentStatusId, OrderId, PaymentMethodId,
    PaymentMethodTypeId, PaymentStatusId, ProductId, UserId,
};
use domain::{
    Address, AuditRecord, Cart, CartLine, FulfillmentStatus, Order, OrderLine, PaymentMethodType,
    PaymentStatus, Product, SavedPaymentMethod, StockRecord,
};

use crate::Result;

/// Core trait for storage backends.
///
/// A store hands out units of work; every read and write of the workflow
/// goes through one. All implementations must be thread-safe.
#[async_trait]
pub trait Store: Send + Sync {
    /// Opens a new unit of work.
    ///
    /// The unit holds whatever locks the backend needs for the duration of
    /// a reservation/release decision; two units racing on the same stock
    /// row must serialize.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}

/// One atomic unit of work over the storefront tables.
///
/// Mutations become visible to other units only after [`commit`] returns.
/// Dropping the unit without committing rolls every mutation back; commit
/// is called exactly once, on every successful exit path.
///
/// [`commit`]: UnitOfWork::commit
#[async_trait]
pub trait UnitOfWork: Send {
    // -- catalog --

    /// Inserts a catalog product.
    async fn insert_product(&mut self, product: &Product) -> Result<()>;

    /// Finds a product by id.
    async fn product(&mut self, id: ProductId) -> Result<Option<Product>>;

    /// Rewrites a product's catalog fields.
    async fn update_product(&mut self, product: &Product) -> Result<()>;

    /// Lists all products, ordered by name.
    async fn products(&mut self) -> Result<Vec<Product>>;

    // -- stock ledger --

    /// Finds the stock record for a product, locking it for the rest of
    /// this unit of work.
    async fn stock_for_update(&mut self, product_id: ProductId) -> Result<Option<StockRecord>>;

    /// Inserts or replaces the stock record for a product.
    async fn upsert_stock(&mut self, record: &StockRecord) -> Result<()>;

    // -- carts --

    /// Returns the user's cart, creating it if absent.
    async fn ensure_cart(&mut self, user_id: UserId) -> Result<Cart>;

    /// Lists the lines of the user's cart; empty if no cart exists.
    async fn cart_lines(&mut self, user_id: UserId) -> Result<Vec<CartLine>>;

    /// Finds the line for a product within a cart.
    async fn cart_line_for_product(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>>;

    /// Finds a cart line by id, only if it belongs to the given user's cart.
    async fn cart_line_owned(
        &mut self,
        user_id: UserId,
        line_id: CartLineId,
    ) -> Result<Option<CartLine>>;

    /// Inserts a cart line.
    async fn insert_cart_line(&mut self, line: &CartLine) -> Result<()>;

    /// Updates the quantity of a cart line.
    async fn update_cart_line_quantity(&mut self, line_id: CartLineId, quantity: u32)
    -> Result<()>;

    /// Deletes a cart line.
    async fn delete_cart_line(&mut self, line_id: CartLineId) -> Result<()>;

    /// Deletes all lines of the user's cart. Idempotent.
    async fn clear_cart(&mut self, user_id: UserId) -> Result<()>;

    // -- orders --

    /// Inserts an order together with its lines.
    async fn insert_order(&mut self, order: &Order, lines: &[OrderLine]) -> Result<()>;

    /// Finds an order by id.
    async fn order(&mut self, id: OrderId) -> Result<Option<Order>>;

    /// Lists the lines of an order.
    async fn order_lines(&mut self, order_id: OrderId) -> Result<Vec<OrderLine>>;

    /// Lists a user's orders, newest first.
    async fn orders_for_user(&mut self, user_id: UserId) -> Result<Vec<Order>>;

    /// Lists every order, newest first.
    async fn all_orders(&mut self) -> Result<Vec<Order>>;

    /// Writes both status references of an order.
    async fn set_order_statuses(
        &mut self,
        id: OrderId,
        fulfillment: FulfillmentStatusId,
        payment: PaymentStatusId,
    ) -> Result<()>;

    // -- reference data --

    /// Finds a fulfillment status by id.
    async fn fulfillment_status(
        &mut self,
        id: FulfillmentStatusId,
    ) -> Result<Option<FulfillmentStatus>>;

    /// Finds a fulfillment status by its seeded name.
    async fn fulfillment_status_named(&mut self, name: &str)
    -> Result<Option<FulfillmentStatus>>;

    /// Finds a payment status by id.
    async fn payment_status(&mut self, id: PaymentStatusId) -> Result<Option<PaymentStatus>>;

    /// Finds a payment status by its seeded name.
    async fn payment_status_named(&mut self, name: &str) -> Result<Option<PaymentStatus>>;

    /// Finds a payment-method type by id.
    async fn payment_method_type(
        &mut self,
        id: PaymentMethodTypeId,
    ) -> Result<Option<PaymentMethodType>>;

    /// Lists all payment-method types.
    async fn payment_method_types(&mut self) -> Result<Vec<PaymentMethodType>>;

    // -- customer profile --

    /// Inserts a saved address.
    async fn insert_address(&mut self, address: &Address) -> Result<()>;

    /// Finds an address by id.
    async fn address(&mut self, id: AddressId) -> Result<Option<Address>>;

    /// Lists a user's saved addresses.
    async fn addresses_for_user(&mut self, user_id: UserId) -> Result<Vec<Address>>;

    /// Inserts a saved payment method.
    async fn insert_payment_method(&mut self, method: &SavedPaymentMethod) -> Result<()>;

    /// Finds a saved payment method by id.
    async fn payment_method(
        &mut self,
        id: PaymentMethodId,
    ) -> Result<Option<SavedPaymentMethod>>;

    /// Lists a user's saved payment methods.
    async fn payment_methods_for_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<SavedPaymentMethod>>;

    // -- audit trail --

    /// Appends an audit record.
    async fn append_audit(&mut self, record: &AuditRecord) -> Result<()>;

    /// Lists audit records, newest first.
    async fn audit_records(&mut self) -> Result<Vec<AuditRecord>>;

    /// Commits every mutation made through this unit of work.
    async fn commit(self: Box<Self>) -> Result<()>;
}
