use async_trait::async_trait;
use common::{
    AddressId, AuditRecordId, CartId, CartLineId, FulfillmentStatusId, Money, OrderId,
    OrderLineId, PaymentMethodId, PaymentMethodTypeId, PaymentStatusId, ProductId, StockRecordId,
    StockStatusId, UserId,
};
use domain::{
    Address, AuditRecord, Cart, CartLine, FulfillmentStatus, Order, OrderLine, PaymentMethodType,
    PaymentStatus, Product, SavedPaymentMethod, StockLevel, StockRecord,
};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Result,
    store::{Store, UnitOfWork},
};

/// PostgreSQL-backed store implementation.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// One open PostgreSQL transaction.
///
/// Row locks taken by `stock_for_update` are held until commit or drop;
/// dropping without commit rolls the transaction back.
struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

fn row_to_product(row: &PgRow) -> Result<Product> {
    Ok(Product {
        id: ProductId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        brand: row.try_get("brand")?,
        price: Money::from_cents(row.try_get("price_cents")?),
        category: row.try_get("category")?,
        created_at: row.try_get("created_at")?,
    })
}

fn row_to_stock(row: &PgRow) -> Result<StockRecord> {
    let raw_quantity: i32 = row.try_get("quantity")?;
    // CHECK (quantity >= 0) keeps this in range
    let quantity = u32::try_from(raw_quantity).unwrap_or_default();
    let status_id: i32 = row.try_get("status_id")?;
    Ok(StockRecord {
        id: StockRecordId::from_uuid(row.try_get("id")?),
        product_id: ProductId::from_uuid(row.try_get("product_id")?),
        quantity,
        level: StockLevel::from_id(StockStatusId::new(status_id))
            .unwrap_or_else(|| StockLevel::for_quantity(quantity)),
    })
}

fn row_to_cart_line(row: &PgRow) -> Result<CartLine> {
    let raw_quantity: i32 = row.try_get("quantity")?;
    Ok(CartLine {
        id: CartLineId::from_uuid(row.try_get("id")?),
        cart_id: CartId::from_uuid(row.try_get("cart_id")?),
        product_id: ProductId::from_uuid(row.try_get("product_id")?),
        quantity: u32::try_from(raw_quantity).unwrap_or_default(),
    })
}

fn row_to_order(row: &PgRow) -> Result<Order> {
    Ok(Order {
        id: OrderId::from_uuid(row.try_get("id")?),
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        created_at: row.try_get("created_at")?,
        total: Money::from_cents(row.try_get("total_cents")?),
        address_id: row
            .try_get::<Option<Uuid>, _>("address_id")?
            .map(AddressId::from_uuid),
        payment_method_type_id: row
            .try_get::<Option<i32>, _>("payment_method_type_id")?
            .map(PaymentMethodTypeId::new),
        fulfillment_status_id: FulfillmentStatusId::new(row.try_get("fulfillment_status_id")?),
        payment_status_id: PaymentStatusId::new(row.try_get("payment_status_id")?),
    })
}

fn row_to_order_line(row: &PgRow) -> Result<OrderLine> {
    let raw_quantity: i32 = row.try_get("quantity")?;
    Ok(OrderLine {
        id: OrderLineId::from_uuid(row.try_get("id")?),
        order_id: OrderId::from_uuid(row.try_get("order_id")?),
        product_id: ProductId::from_uuid(row.try_get("product_id")?),
        quantity: u32::try_from(raw_quantity).unwrap_or_default(),
        unit_price: Money::from_cents(row.try_get("unit_price_cents")?),
    })
}

fn row_to_address(row: &PgRow) -> Result<Address> {
    Ok(Address {
        id: AddressId::from_uuid(row.try_get("id")?),
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        province: row.try_get("province")?,
        city: row.try_get("city")?,
        street: row.try_get("street")?,
        number: row.try_get("number")?,
        postal_code: row.try_get("postal_code")?,
    })
}

fn row_to_payment_method(row: &PgRow) -> Result<SavedPaymentMethod> {
    Ok(SavedPaymentMethod {
        id: PaymentMethodId::from_uuid(row.try_get("id")?),
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        type_id: PaymentMethodTypeId::new(row.try_get("type_id")?),
        holder: row.try_get("holder")?,
        last4: row.try_get("last4")?,
        expiry: row.try_get("expiry")?,
    })
}

fn row_to_audit(row: &PgRow) -> Result<AuditRecord> {
    Ok(AuditRecord {
        id: AuditRecordId::from_uuid(row.try_get("id")?),
        user_id: row
            .try_get::<Option<Uuid>, _>("user_id")?
            .map(UserId::from_uuid),
        recorded_at: row.try_get("recorded_at")?,
        action: row.try_get("action")?,
        affected_entity: row.try_get("affected_entity")?,
        old_value: row.try_get("old_value")?,
        new_value: row.try_get("new_value")?,
    })
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn insert_product(&mut self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, brand, price_cents, category, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.brand)
        .bind(product.price.cents())
        .bind(&product.category)
        .bind(product.created_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn product(&mut self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT * FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(row_to_product).transpose()
    }

    async fn update_product(&mut self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, brand = $4, price_cents = $5, category = $6
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.brand)
        .bind(product.price.cents())
        .bind(&product.category)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn products(&mut self) -> Result<Vec<Product>> {
        let rows = sqlx::query("SELECT * FROM products ORDER BY name")
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter().map(row_to_product).collect()
    }

    async fn stock_for_update(&mut self, product_id: ProductId) -> Result<Option<StockRecord>> {
        let row = sqlx::query(
            "SELECT id, product_id, quantity, status_id FROM stock_records WHERE product_id = $1 FOR UPDATE",
        )
        .bind(product_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(row_to_stock).transpose()
    }

    async fn upsert_stock(&mut self, record: &StockRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_records (id, product_id, quantity, status_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id)
            DO UPDATE SET quantity = EXCLUDED.quantity, status_id = EXCLUDED.status_id
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.product_id.as_uuid())
        .bind(record.quantity as i32)
        .bind(record.level.id().as_i32())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn ensure_cart(&mut self, user_id: UserId) -> Result<Cart> {
        let existing = sqlx::query("SELECT id, user_id FROM carts WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        if let Some(row) = existing {
            return Ok(Cart {
                id: CartId::from_uuid(row.try_get("id")?),
                user_id: UserId::from_uuid(row.try_get("user_id")?),
            });
        }

        let cart = Cart::new(user_id);
        sqlx::query("INSERT INTO carts (id, user_id) VALUES ($1, $2)")
            .bind(cart.id.as_uuid())
            .bind(cart.user_id.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        Ok(cart)
    }

    async fn cart_lines(&mut self, user_id: UserId) -> Result<Vec<CartLine>> {
        let rows = sqlx::query(
            r#"
            SELECT cl.id, cl.cart_id, cl.product_id, cl.quantity
            FROM cart_lines cl
            JOIN carts c ON c.id = cl.cart_id
            WHERE c.user_id = $1
            ORDER BY cl.id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&mut *self.tx)
        .await?;
        rows.iter().map(row_to_cart_line).collect()
    }

    async fn cart_line_for_product(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>> {
        let row = sqlx::query(
            "SELECT id, cart_id, product_id, quantity FROM cart_lines WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(cart_id.as_uuid())
        .bind(product_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(row_to_cart_line).transpose()
    }

    async fn cart_line_owned(
        &mut self,
        user_id: UserId,
        line_id: CartLineId,
    ) -> Result<Option<CartLine>> {
        let row = sqlx::query(
            r#"
            SELECT cl.id, cl.cart_id, cl.product_id, cl.quantity
            FROM cart_lines cl
            JOIN carts c ON c.id = cl.cart_id
            WHERE cl.id = $1 AND c.user_id = $2
            "#,
        )
        .bind(line_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await?;
        row.as_ref().map(row_to_cart_line).transpose()
    }

    async fn insert_cart_line(&mut self, line: &CartLine) -> Result<()> {
        sqlx::query(
            "INSERT INTO cart_lines (id, cart_id, product_id, quantity) VALUES ($1, $2, $3, $4)",
        )
        .bind(line.id.as_uuid())
        .bind(line.cart_id.as_uuid())
        .bind(line.product_id.as_uuid())
        .bind(line.quantity as i32)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn update_cart_line_quantity(
        &mut self,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<()> {
        sqlx::query("UPDATE cart_lines SET quantity = $2 WHERE id = $1")
            .bind(line_id.as_uuid())
            .bind(quantity as i32)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_cart_line(&mut self, line_id: CartLineId) -> Result<()> {
        sqlx::query("DELETE FROM cart_lines WHERE id = $1")
            .bind(line_id.as_uuid())
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn clear_cart(&mut self, user_id: UserId) -> Result<()> {
        sqlx::query(
            r#"
            DELETE FROM cart_lines cl
            USING carts c
            WHERE cl.cart_id = c.id AND c.user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_order(&mut self, order: &Order, lines: &[OrderLine]) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, created_at, total_cents, address_id,
                                payment_method_type_id, fulfillment_status_id, payment_status_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.created_at)
        .bind(order.total.cents())
        .bind(order.address_id.map(|id| id.as_uuid()))
        .bind(order.payment_method_type_id.map(|id| id.as_i32()))
        .bind(order.fulfillment_status_id.as_i32())
        .bind(order.payment_status_id.as_i32())
        .execute(&mut *self.tx)
        .await?;

        for line in lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines (id, order_id, product_id, quantity, unit_price_cents)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(line.id.as_uuid())
            .bind(line.order_id.as_uuid())
            .bind(line.product_id.as_uuid())
            .bind(line.quantity as i32)
            .bind(line.unit_price.cents())
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }

    async fn order(&mut self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(row_to_order).transpose()
    }

    async fn order_lines(&mut self, order_id: OrderId) -> Result<Vec<OrderLine>> {
        let rows = sqlx::query("SELECT * FROM order_lines WHERE order_id = $1 ORDER BY id")
            .bind(order_id.as_uuid())
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter().map(row_to_order_line).collect()
    }

    async fn orders_for_user(&mut self, user_id: UserId) -> Result<Vec<Order>> {
        let rows =
            sqlx::query("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC")
                .bind(user_id.as_uuid())
                .fetch_all(&mut *self.tx)
                .await?;
        rows.iter().map(row_to_order).collect()
    }

    async fn all_orders(&mut self) -> Result<Vec<Order>> {
        let rows = sqlx::query("SELECT * FROM orders ORDER BY created_at DESC")
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter().map(row_to_order).collect()
    }

    async fn set_order_statuses(
        &mut self,
        id: OrderId,
        fulfillment: FulfillmentStatusId,
        payment: PaymentStatusId,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE orders SET fulfillment_status_id = $2, payment_status_id = $3 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(fulfillment.as_i32())
        .bind(payment.as_i32())
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn fulfillment_status(
        &mut self,
        id: FulfillmentStatusId,
    ) -> Result<Option<FulfillmentStatus>> {
        let row = sqlx::query("SELECT id, name FROM fulfillment_statuses WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row
            .map(|row| -> Result<FulfillmentStatus> {
                Ok(FulfillmentStatus {
                    id: FulfillmentStatusId::new(row.try_get("id")?),
                    name: row.try_get("name")?,
                })
            })
            .transpose()?)
    }

    async fn fulfillment_status_named(
        &mut self,
        name: &str,
    ) -> Result<Option<FulfillmentStatus>> {
        let row = sqlx::query("SELECT id, name FROM fulfillment_statuses WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row
            .map(|row| -> Result<FulfillmentStatus> {
                Ok(FulfillmentStatus {
                    id: FulfillmentStatusId::new(row.try_get("id")?),
                    name: row.try_get("name")?,
                })
            })
            .transpose()?)
    }

    async fn payment_status(&mut self, id: PaymentStatusId) -> Result<Option<PaymentStatus>> {
        let row = sqlx::query("SELECT id, name FROM payment_statuses WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row
            .map(|row| -> Result<PaymentStatus> {
                Ok(PaymentStatus {
                    id: PaymentStatusId::new(row.try_get("id")?),
                    name: row.try_get("name")?,
                })
            })
            .transpose()?)
    }

    async fn payment_status_named(&mut self, name: &str) -> Result<Option<PaymentStatus>> {
        let row = sqlx::query("SELECT id, name FROM payment_statuses WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row
            .map(|row| -> Result<PaymentStatus> {
                Ok(PaymentStatus {
                    id: PaymentStatusId::new(row.try_get("id")?),
                    name: row.try_get("name")?,
                })
            })
            .transpose()?)
    }

    async fn payment_method_type(
        &mut self,
        id: PaymentMethodTypeId,
    ) -> Result<Option<PaymentMethodType>> {
        let row = sqlx::query("SELECT id, name FROM payment_method_types WHERE id = $1")
            .bind(id.as_i32())
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(row
            .map(|row| -> Result<PaymentMethodType> {
                Ok(PaymentMethodType {
                    id: PaymentMethodTypeId::new(row.try_get("id")?),
                    name: row.try_get("name")?,
                })
            })
            .transpose()?)
    }

    async fn payment_method_types(&mut self) -> Result<Vec<PaymentMethodType>> {
        let rows = sqlx::query("SELECT id, name FROM payment_method_types ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await?;
        rows.into_iter()
            .map(|row| -> Result<PaymentMethodType> {
                Ok(PaymentMethodType {
                    id: PaymentMethodTypeId::new(row.try_get("id")?),
                    name: row.try_get("name")?,
                })
            })
            .collect()
    }

    async fn insert_address(&mut self, address: &Address) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO addresses (id, user_id, province, city, street, number, postal_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(address.id.as_uuid())
        .bind(address.user_id.as_uuid())
        .bind(&address.province)
        .bind(&address.city)
        .bind(&address.street)
        .bind(&address.number)
        .bind(&address.postal_code)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn address(&mut self, id: AddressId) -> Result<Option<Address>> {
        let row = sqlx::query("SELECT * FROM addresses WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(row_to_address).transpose()
    }

    async fn addresses_for_user(&mut self, user_id: UserId) -> Result<Vec<Address>> {
        let rows = sqlx::query("SELECT * FROM addresses WHERE user_id = $1 ORDER BY id")
            .bind(user_id.as_uuid())
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter().map(row_to_address).collect()
    }

    async fn insert_payment_method(&mut self, method: &SavedPaymentMethod) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_methods (id, user_id, type_id, holder, last4, expiry)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(method.id.as_uuid())
        .bind(method.user_id.as_uuid())
        .bind(method.type_id.as_i32())
        .bind(&method.holder)
        .bind(&method.last4)
        .bind(&method.expiry)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn payment_method(
        &mut self,
        id: PaymentMethodId,
    ) -> Result<Option<SavedPaymentMethod>> {
        let row = sqlx::query("SELECT * FROM payment_methods WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await?;
        row.as_ref().map(row_to_payment_method).transpose()
    }

    async fn payment_methods_for_user(
        &mut self,
        user_id: UserId,
    ) -> Result<Vec<SavedPaymentMethod>> {
        let rows = sqlx::query("SELECT * FROM payment_methods WHERE user_id = $1 ORDER BY id")
            .bind(user_id.as_uuid())
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter().map(row_to_payment_method).collect()
    }

    async fn append_audit(&mut self, record: &AuditRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_records (id, user_id, recorded_at, action, affected_entity,
                                       old_value, new_value)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.as_uuid())
        .bind(record.user_id.map(|id| id.as_uuid()))
        .bind(record.recorded_at)
        .bind(&record.action)
        .bind(&record.affected_entity)
        .bind(&record.old_value)
        .bind(&record.new_value)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn audit_records(&mut self) -> Result<Vec<AuditRecord>> {
        let rows = sqlx::query("SELECT * FROM audit_records ORDER BY recorded_at DESC")
            .fetch_all(&mut *self.tx)
            .await?;
        rows.iter().map(row_to_audit).collect()
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
