use std::sync::Arc;

use async_trait::async_trait;
use common::{
    AddressId, CartId, CartLineId, FulfillmentStatusId, OrderId, PaymentMethodId,
    PaymentMethodTypeId, PaymentStatusId, ProductId, UserId,
};
use domain::{
    Address, AuditRecord, Cart, CartLine, FulfillmentStatus, Order, OrderLine, PaymentMethodType,
    PaymentStatus, Product, SavedPaymentMethod, StockRecord, status_names,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    Result,
    store::{Store, UnitOfWork},
};

/// The storefront tables.
#[derive(Debug, Clone, Default)]
struct Tables {
    products: Vec<Product>,
    stock: Vec<StockRecord>,
    carts: Vec<Cart>,
    cart_lines: Vec<CartLine>,
    orders: Vec<Order>,
    order_lines: Vec<OrderLine>,
    fulfillment_statuses: Vec<FulfillmentStatus>,
    payment_statuses: Vec<PaymentStatus>,
    payment_method_types: Vec<PaymentMethodType>,
    addresses: Vec<Address>,
    payment_methods: Vec<SavedPaymentMethod>,
    audit_records: Vec<AuditRecord>,
}

/// In-memory store implementation for testing.
///
/// Provides the same interface as the PostgreSQL implementation. Units of
/// work stage their mutations on a snapshot of the tables and publish it on
/// commit; dropping a unit without committing discards the snapshot. Units
/// are serialized by a single owned mutex, which stands in for the row
/// locks the PostgreSQL backend takes on stock records.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    /// Creates a new store with the reference tables seeded as the
    /// migrations seed them.
    pub fn new() -> Self {
        let fulfillment = [
            status_names::PENDIENTE,
            status_names::CONFIRMADO,
            status_names::ENVIADO,
            status_names::ENTREGADO,
            status_names::CANCELADO,
            status_names::DEVUELTO,
        ];
        let payment = [
            status_names::PENDIENTE,
            status_names::PAGADO,
            status_names::REEMBOLSADO,
        ];
        let method_types = ["Efectivo", "Tarjeta", "MercadoPago"];

        let tables = Tables {
            fulfillment_statuses: fulfillment
                .iter()
                .enumerate()
                .map(|(i, name)| FulfillmentStatus {
                    id: FulfillmentStatusId::new(i as i32 + 1),
                    name: (*name).to_string(),
                })
                .collect(),
            payment_statuses: payment
                .iter()
                .enumerate()
                .map(|(i, name)| PaymentStatus {
                    id: PaymentStatusId::new(i as i32 + 1),
                    name: (*name).to_string(),
                })
                .collect(),
            payment_method_types: method_types
                .iter()
                .enumerate()
                .map(|(i, name)| PaymentMethodType {
                    id: PaymentMethodTypeId::new(i as i32 + 1),
                    name: (*name).to_string(),
                })
                .collect(),
            ..Tables::default()
        };

        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = (*guard).clone();
        Ok(Box::new(InMemoryUnitOfWork { guard, staged }))
    }
}

struct InMemoryUnitOfWork {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn insert_product(&mut self, product: &Product) -> Result<()> {
        self.staged.products.push(product.clone());
        Ok(())
    }

    async fn product(&mut self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.staged.products.iter().find(|p| p.id == id).cloned())
    }

    async fn update_product(&mut self, product: &Product) -> Result<()> {
        if let Some(existing) = self.staged.products.iter_mut().find(|p| p.id == product.id) {
            *existing = product.clone();
        }
        Ok(())
    }

    async fn products(&mut self) -> Result<Vec<Product>> {
        let mut products = self.staged.products.clone();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn stock_for_update(&mut self, product_id: ProductId) -> Result<Option<StockRecord>> {
        Ok(self
            .staged
            .stock
            .iter()
            .find(|s| s.product_id == product_id)
            .cloned())
    }

    async fn upsert_stock(&mut self, record: &StockRecord) -> Result<()> {
        match self
            .staged
            .stock
            .iter_mut()
            .find(|s| s.product_id == record.product_id)
        {
            Some(existing) => *existing = record.clone(),
            None => self.staged.stock.push(record.clone()),
        }
        Ok(())
    }

    async fn ensure_cart(&mut self, user_id: UserId) -> Result<Cart> {
        if let Some(cart) = self.staged.carts.iter().find(|c| c.user_id == user_id) {
            return Ok(*cart);
        }
        let cart = Cart::new(user_id);
        self.staged.carts.push(cart);
        Ok(cart)
    }

    async fn cart_lines(&mut self, user_id: UserId) -> Result<Vec<CartLine>> {
        let Some(cart) = self.staged.carts.iter().find(|c| c.user_id == user_id) else {
            return Ok(Vec::new());
        };
        Ok(self
            .staged
            .cart_lines
            .iter()
            .filter(|l| l.cart_id == cart.id)
            .cloned()
            .collect())
    }

    async fn cart_line_for_product(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>> {
        Ok(self
            .staged
            .cart_lines
            .iter()
            .find(|l| l.cart_id == cart_id && l.product_id == product_id)
            .cloned())
    }

    async fn cart_line_owned(
        &mut self,
        user_id: UserId,
        line_id: CartLineId,
    ) -> Result<Option<CartLine>> {
        let Some(cart) = self.staged.carts.iter().find(|c| c.user_id == user_id) else {
            return Ok(None);
        };
        Ok(self
            .staged
            .cart_lines
            .iter()
            .find(|l| l.id == line_id && l.cart_id == cart.id)
            .cloned())
    }

    async fn insert_cart_line(&mut self, line: &CartLine) -> Result<()> {
        self.staged.cart_lines.push(line.clone());
        Ok(())
    }

    async fn update_cart_line_quantity(
        &mut self,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<()> {
        if let Some(line) = self.staged.cart_lines.iter_mut().find(|l| l.id == line_id) {
            line.quantity = quantity;
        }
        Ok(())
    }

    async fn delete_cart_line(&mut self, line_id: CartLineId) -> Result<()> {
        self.staged.cart_lines.retain(|l| l.id != line_id);
        Ok(())
    }

    async fn clear_cart(&mut self, user_id: UserId) -> Result<()> {
        if let Some(cart) = self.staged.carts.iter().find(|c| c.user_id == user_id) {
            let cart_id = cart.id;
            self.staged.cart_lines.retain(|l| l.cart_id != cart_id);
        }
        Ok(())
    }

    async fn insert_order(&mut self, order: &Order, lines: &[OrderLine]) -> Result<()> {
        self.staged.orders.push(order.clone());
        self.staged.order_lines.extend_from_slice(lines);
        Ok(())
    }

    async fn order(&mut self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.staged.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn order_lines(&mut self, order_id: OrderId) -> Result<Vec<OrderLine>> {
        Ok(self
            .staged
            .order_lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect())
    }

    async fn orders_for_user(&mut self, user_id: UserId) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .staged
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn all_orders(&mut self) -> Result<Vec<Order>> {
        let mut orders = self.staged.orders.clone();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn set_order_statuses(
        &mut self,
        id: OrderId,
        fulfillment: FulfillmentStatusId,
        payment: PaymentStatusId,
    ) -> Result<()> {
        if let Some(order) = self.staged.orders.iter_mut().find(|o| o.id == id) {
            order.fulfillment_status_id = fulfillment;
            order.payment_status_id = payment;
        }
        Ok(())
    }

    async fn fulfillment_status(
        &mut self,
        id: FulfillmentStatusId,
    ) -> Result<Option<FulfillmentStatus>> {
        Ok(self
            .staged
            .fulfillment_statuses
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn fulfillment_status_named(
        &mut self,
        name: &str,
    ) -> Result<Option<FulfillmentStatus>> {
        Ok(self
            .staged
            .fulfillment_statuses
            .iter()
            .find(|s| s.name == name)
            .cloned())
    }

    async fn payment_status(&mut self, id: PaymentStatusId) -> Result<Option<PaymentStatus>> {
        Ok(self
            .staged
            .payment_statuses
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn payment_status_named(&mut self, name: &str) -> Result<Option<PaymentStatus>> {
        Ok(self
            .staged
            .payment_statuses
            .iter()
            .find(|s| s.name == name)
            .cloned())
    }

    async fn payment_method_type(
        &mut self,
        id: PaymentMethodTypeId,
    ) -> Result<Option<PaymentMethodType>> {
        Ok(self
            .staged
            .payment_method_types
            .iter()
            .find(|t| t.id == id)
            .cloned())
    }

    async fn payment_method_types(&mut self) -> Result<Vec<PaymentMethodType>> {
        Ok(self.staged.payment_method_types.clone())
    }

    async fn insert_address(&mut self, address: &Address) -> Result<()> {
        self.staged.addresses.push(address.clone());
        Ok(())
    }

    async fn address(&mut self, id: AddressId) -> Result<Option<Address>> {
        Ok(self.staged.addresses.iter().find(|a| a.id == id).cloned())
    }

    async fn addresses_for_user(&mut self, user_id: UserId) -> Result<Vec<Address>> {
        Ok(self
            .staged
            .addresses
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert_payment_method(&mut self, method: &SavedPaymentMethod) -> Result<()> {
        self.staged.payment_methods.push(method.clone());
        Ok(())
    }

    async fn payment_method(
        &mut self,
        id: PaymentMethodId,
    ) -> Result<Option<SavedPaymentMethod>> {
        Ok(self
            .staged
            .payment_methods
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn payment_methods_for_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<SavedPaymentMethod>> {
        Ok(self
            .staged
            .payment_methods
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn append_audit(&mut self, record: &AuditRecord) -> Result<()> {
        self.staged.audit_records.push(record.clone());
        Ok(())
    }

    async fn audit_records(&mut self) -> Result<Vec<AuditRecord>> {
        let mut records = self.staged.audit_records.clone();
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(records)
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryUnitOfWork { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use common::Money;

    use super::*;

    fn product(name: &str, cents: i64) -> Product {
        Product::new(name, None, None, Money::from_cents(cents), None, Utc::now())
    }

    #[tokio::test]
    async fn test_commit_publishes_mutations() {
        let store = InMemoryStore::new();

        let mut uow = store.begin().await.unwrap();
        uow.insert_product(&product("Yerba", 1500)).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        assert_eq!(uow.products().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_drop_without_commit_rolls_back() {
        let store = InMemoryStore::new();

        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_product(&product("Yerba", 1500)).await.unwrap();
            // dropped here without commit
        }

        let mut uow = store.begin().await.unwrap();
        assert!(uow.products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reference_tables_are_seeded() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();

        let pending = uow
            .fulfillment_status_named("Pendiente")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.id.as_i32(), 1);
        assert!(
            uow.fulfillment_status_named("Devuelto")
                .await
                .unwrap()
                .unwrap()
                .is_annulled()
        );
        assert!(uow.payment_status_named("Pagado").await.unwrap().is_some());
        assert_eq!(uow.payment_method_types().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_ensure_cart_is_idempotent() {
        let store = InMemoryStore::new();
        let user = UserId::new();

        let mut uow = store.begin().await.unwrap();
        let first = uow.ensure_cart(user).await.unwrap();
        let second = uow.ensure_cart(user).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_cart_lines_empty_without_cart() {
        let store = InMemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        assert!(uow.cart_lines(UserId::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_stock_replaces_existing() {
        let store = InMemoryStore::new();
        let product_id = ProductId::new();

        let mut uow = store.begin().await.unwrap();
        let mut record = StockRecord::new(product_id, 10);
        uow.upsert_stock(&record).await.unwrap();
        record.reserve(4).unwrap();
        uow.upsert_stock(&record).await.unwrap();

        let stored = uow.stock_for_update(product_id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 6);
    }

    #[tokio::test]
    async fn test_cart_line_owned_rejects_foreign_lines() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let other = UserId::new();

        let mut uow = store.begin().await.unwrap();
        let cart = uow.ensure_cart(owner).await.unwrap();
        let line = CartLine::new(cart.id, ProductId::new(), 1);
        uow.insert_cart_line(&line).await.unwrap();

        assert!(uow.cart_line_owned(owner, line.id).await.unwrap().is_some());
        assert!(uow.cart_line_owned(other, line.id).await.unwrap().is_none());
    }
}
