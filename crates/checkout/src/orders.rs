//! Order placement, cancellation and admin status transitions.

use chrono::Utc;
use common::{OrderId, UserId};
use domain::{AuditRecord, NewOrderLine, Order, StockError, StockRecord, status_names};
use store::{Store, UnitOfWork};

use crate::error::{CheckoutError, Shortfall};
use crate::service::{
    CheckoutService, OrderView, PlaceOrderRequest, PlacedOrder, StatusChangeRequest, order_view,
    release_stock,
};

impl<S: Store> CheckoutService<S> {
    /// Converts the caller's cart into an order.
    ///
    /// Validates the address, the optional saved payment method and the
    /// optional payment-method type, then checks stock for every line
    /// before touching anything. On success the order snapshot is written,
    /// stock is decremented per line and the cart is emptied, all in one
    /// unit of work.
    #[tracing::instrument(skip(self, request))]
    pub async fn place_order(
        &self,
        user_id: UserId,
        request: PlaceOrderRequest,
    ) -> Result<PlacedOrder, CheckoutError> {
        let started = std::time::Instant::now();
        let mut uow = self.begin().await?;

        let cart_lines = uow.cart_lines(user_id).await?;
        if cart_lines.is_empty() {
            return Err(CheckoutError::InvalidOrder("the cart is empty".to_string()));
        }

        uow.address(request.address_id)
            .await?
            .filter(|a| a.user_id == user_id)
            .ok_or_else(|| {
                CheckoutError::InvalidOrder(
                    "address does not exist or does not belong to the caller".to_string(),
                )
            })?;

        let mut payment_type_id = request.payment_method_type_id;
        if let Some(method_id) = request.payment_method_id {
            let method = uow
                .payment_method(method_id)
                .await?
                .filter(|m| m.user_id == user_id)
                .ok_or_else(|| {
                    CheckoutError::InvalidOrder(
                        "payment method does not exist or does not belong to the caller"
                            .to_string(),
                    )
                })?;
            payment_type_id = payment_type_id.or(Some(method.type_id));
        }
        if let Some(type_id) = payment_type_id {
            uow.payment_method_type(type_id).await?.ok_or_else(|| {
                CheckoutError::InvalidOrder("unknown payment method type".to_string())
            })?;
        }

        // Validate stock for all lines before any mutation; a shortfall on
        // any line aborts the whole placement.
        let mut new_lines = Vec::with_capacity(cart_lines.len());
        let mut reservations: Vec<StockRecord> = Vec::with_capacity(cart_lines.len());
        let mut shortfalls: Vec<Shortfall> = Vec::new();
        for line in &cart_lines {
            let product = uow
                .product(line.product_id)
                .await?
                .ok_or(CheckoutError::NotFound("product"))?;

            match uow.stock_for_update(line.product_id).await? {
                None => shortfalls.push(Shortfall {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: 0,
                }),
                Some(mut record) => match record.reserve(line.quantity) {
                    Ok(()) => reservations.push(record),
                    Err(StockError::Insufficient {
                        available,
                        requested,
                    }) => shortfalls.push(Shortfall {
                        product_id: line.product_id,
                        requested,
                        available,
                    }),
                    Err(err @ StockError::NegativeQuantity(_)) => {
                        return Err(CheckoutError::InvalidArgument(err.to_string()));
                    }
                },
            }

            new_lines.push(NewOrderLine {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: product.price,
            });
        }
        if !shortfalls.is_empty() {
            return Err(CheckoutError::InsufficientStock(shortfalls));
        }

        let pending_fulfillment = uow
            .fulfillment_status_named(status_names::PENDIENTE)
            .await?
            .ok_or(CheckoutError::MissingReference("fulfillment status Pendiente"))?;
        let pending_payment = uow
            .payment_status_named(status_names::PENDIENTE)
            .await?
            .ok_or(CheckoutError::MissingReference("payment status Pendiente"))?;

        let (order, order_lines) = Order::place(
            user_id,
            request.address_id,
            payment_type_id,
            new_lines,
            pending_fulfillment.id,
            pending_payment.id,
            Utc::now(),
        );

        uow.insert_order(&order, &order_lines).await?;
        for record in &reservations {
            uow.upsert_stock(record).await?;
        }
        uow.clear_cart(user_id).await?;
        uow.commit().await?;

        metrics::counter!("orders_placed_total").increment(1);
        metrics::histogram!("place_order_duration_seconds")
            .record(started.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id, total = %order.total, "order placed");

        Ok(PlacedOrder {
            order_id: order.id,
            total: order.total,
        })
    }

    /// Cancels the caller's order, restoring its reserved stock.
    ///
    /// Permitted only while the order is Pendiente or Confirmado; the
    /// payment status is left untouched.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<(), CheckoutError> {
        let mut uow = self.begin().await?;

        let order = uow
            .order(order_id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or(CheckoutError::NotFound("order"))?;

        let current = uow
            .fulfillment_status(order.fulfillment_status_id)
            .await?
            .ok_or(CheckoutError::MissingReference("fulfillment status"))?;
        if !current.allows_client_cancel() {
            return Err(CheckoutError::InvalidTransition { from: current.name });
        }

        let cancelled = uow
            .fulfillment_status_named(status_names::CANCELADO)
            .await?
            .ok_or(CheckoutError::MissingReference("fulfillment status Cancelado"))?;

        for line in uow.order_lines(order_id).await? {
            release_stock(&mut *uow, line.product_id, line.quantity).await?;
        }
        uow.set_order_statuses(order_id, cancelled.id, order.payment_status_id)
            .await?;

        // Audit entry shares the unit of work: a rollback of the
        // cancellation removes it as well.
        let audit = AuditRecord::new(
            Some(user_id),
            Utc::now(),
            "order cancelled",
            "orders",
            Some(current.name.clone()),
            Some(cancelled.name.clone()),
        );
        uow.append_audit(&audit).await?;

        uow.commit().await?;
        metrics::counter!("orders_cancelled_total").increment(1);
        tracing::info!(%order_id, "order cancelled");
        Ok(())
    }

    /// Moves an order's fulfillment and/or payment status (admin).
    ///
    /// The stock side effect derives from the annulled-ness delta of the
    /// fulfillment change: active→annulled releases stock; annulled→active
    /// re-reserves it, and a shortfall aborts the whole transition
    /// including the status write.
    #[tracing::instrument(skip(self, change))]
    pub async fn admin_set_status(
        &self,
        admin_id: UserId,
        order_id: OrderId,
        change: StatusChangeRequest,
    ) -> Result<(), CheckoutError> {
        let mut uow = self.begin().await?;

        let order = uow
            .order(order_id)
            .await?
            .ok_or(CheckoutError::NotFound("order"))?;

        let mut fulfillment_id = order.fulfillment_status_id;
        let mut payment_id = order.payment_status_id;

        if let Some(target) = change.payment_status_id {
            uow.payment_status(target)
                .await?
                .ok_or(CheckoutError::NotFound("payment status"))?;
            payment_id = target;
        }

        if let Some(target) = change.fulfillment_status_id {
            let old = uow
                .fulfillment_status(order.fulfillment_status_id)
                .await?
                .ok_or(CheckoutError::MissingReference("fulfillment status"))?;
            let new = uow
                .fulfillment_status(target)
                .await?
                .ok_or(CheckoutError::NotFound("fulfillment status"))?;

            if old.is_annulled() != new.is_annulled() {
                if new.is_annulled() {
                    for line in uow.order_lines(order_id).await? {
                        release_stock(&mut *uow, line.product_id, line.quantity).await?;
                    }
                } else {
                    self.reserve_all(&mut *uow, order_id).await?;
                }

                let audit = AuditRecord::new(
                    Some(admin_id),
                    Utc::now(),
                    "order status change",
                    "orders",
                    Some(old.name.clone()),
                    Some(new.name.clone()),
                );
                uow.append_audit(&audit).await?;
            }
            fulfillment_id = target;
        }

        uow.set_order_statuses(order_id, fulfillment_id, payment_id)
            .await?;
        uow.commit().await?;

        metrics::counter!("order_status_changes_total").increment(1);
        tracing::info!(%order_id, "order status changed");
        Ok(())
    }

    /// Re-reserves stock for every line of an order (reactivation).
    ///
    /// All-or-nothing: shortfalls are collected over all lines and fail
    /// the whole call before any stock write.
    async fn reserve_all(
        &self,
        uow: &mut dyn UnitOfWork,
        order_id: OrderId,
    ) -> Result<(), CheckoutError> {
        let lines = uow.order_lines(order_id).await?;
        let mut reservations: Vec<StockRecord> = Vec::with_capacity(lines.len());
        let mut shortfalls: Vec<Shortfall> = Vec::new();

        for line in &lines {
            match uow.stock_for_update(line.product_id).await? {
                None => shortfalls.push(Shortfall {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available: 0,
                }),
                Some(mut record) => match record.reserve(line.quantity) {
                    Ok(()) => reservations.push(record),
                    Err(StockError::Insufficient {
                        available,
                        requested,
                    }) => shortfalls.push(Shortfall {
                        product_id: line.product_id,
                        requested,
                        available,
                    }),
                    Err(err @ StockError::NegativeQuantity(_)) => {
                        return Err(CheckoutError::InvalidArgument(err.to_string()));
                    }
                },
            }
        }

        if !shortfalls.is_empty() {
            return Err(CheckoutError::InsufficientStock(shortfalls));
        }
        for record in &reservations {
            uow.upsert_stock(record).await?;
        }
        Ok(())
    }

    /// Returns one of the caller's orders with lines and status names.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<OrderView, CheckoutError> {
        let mut uow = self.begin().await?;

        let order = uow
            .order(order_id)
            .await?
            .filter(|o| o.user_id == user_id)
            .ok_or(CheckoutError::NotFound("order"))?;
        let view = order_view(&mut *uow, order).await?;

        uow.commit().await?;
        Ok(view)
    }

    /// Lists the caller's orders, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_my_orders(&self, user_id: UserId) -> Result<Vec<OrderView>, CheckoutError> {
        let mut uow = self.begin().await?;

        let mut views = Vec::new();
        for order in uow.orders_for_user(user_id).await? {
            views.push(order_view(&mut *uow, order).await?);
        }

        uow.commit().await?;
        Ok(views)
    }

    /// Lists every order in the system, newest first (admin).
    #[tracing::instrument(skip(self))]
    pub async fn list_all_orders(&self) -> Result<Vec<OrderView>, CheckoutError> {
        let mut uow = self.begin().await?;

        let mut views = Vec::new();
        for order in uow.all_orders().await? {
            views.push(order_view(&mut *uow, order).await?);
        }

        uow.commit().await?;
        Ok(views)
    }
}
