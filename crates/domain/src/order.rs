//! Order entities: an immutable snapshot of purchased lines.

use chrono::{DateTime, Utc};
use common::{
    AddressId, FulfillmentStatusId, Money, OrderId, OrderLineId, PaymentMethodTypeId,
    PaymentStatusId, ProductId, UserId,
};
use serde::{Deserialize, Serialize};

/// A placed order.
///
/// Everything except the two status references is immutable once created;
/// cancellation and returns are status transitions, never deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub total: Money,
    pub address_id: Option<AddressId>,
    pub payment_method_type_id: Option<PaymentMethodTypeId>,
    pub fulfillment_status_id: FulfillmentStatusId,
    pub payment_status_id: PaymentStatusId,
}

/// One immutable line of a placed order.
///
/// The unit price is captured at purchase time and never recomputed from
/// the current catalog price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    /// Returns quantity × unit price for this line.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// Input for one line of an order being placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

/// Sums line subtotals into an order total.
pub fn order_total(lines: &[OrderLine]) -> Money {
    lines.iter().map(OrderLine::subtotal).sum()
}

impl Order {
    /// Builds an order snapshot and its lines from cart contents.
    ///
    /// The total always equals the sum of line subtotals; both are computed
    /// here and nowhere else.
    pub fn place(
        user_id: UserId,
        address_id: AddressId,
        payment_method_type_id: Option<PaymentMethodTypeId>,
        lines: Vec<NewOrderLine>,
        fulfillment_status_id: FulfillmentStatusId,
        payment_status_id: PaymentStatusId,
        created_at: DateTime<Utc>,
    ) -> (Order, Vec<OrderLine>) {
        let order_id = OrderId::new();
        let lines: Vec<OrderLine> = lines
            .into_iter()
            .map(|line| OrderLine {
                id: OrderLineId::new(),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        let order = Order {
            id: order_id,
            user_id,
            created_at,
            total: order_total(&lines),
            address_id: Some(address_id),
            payment_method_type_id,
            fulfillment_status_id,
            payment_status_id,
        };

        (order, lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_line(quantity: u32, unit_price_cents: i64) -> NewOrderLine {
        NewOrderLine {
            product_id: ProductId::new(),
            quantity,
            unit_price: Money::from_cents(unit_price_cents),
        }
    }

    #[test]
    fn test_subtotal() {
        let (_, lines) = Order::place(
            UserId::new(),
            AddressId::new(),
            None,
            vec![new_line(3, 1000)],
            FulfillmentStatusId::new(1),
            PaymentStatusId::new(1),
            Utc::now(),
        );
        assert_eq!(lines[0].subtotal().cents(), 3000);
    }

    #[test]
    fn test_total_equals_sum_of_subtotals() {
        let (order, lines) = Order::place(
            UserId::new(),
            AddressId::new(),
            None,
            vec![new_line(2, 1050), new_line(1, 399), new_line(4, 25)],
            FulfillmentStatusId::new(1),
            PaymentStatusId::new(1),
            Utc::now(),
        );
        assert_eq!(order.total, order_total(&lines));
        assert_eq!(order.total.cents(), 2 * 1050 + 399 + 4 * 25);
    }

    #[test]
    fn test_lines_reference_their_order() {
        let (order, lines) = Order::place(
            UserId::new(),
            AddressId::new(),
            Some(PaymentMethodTypeId::new(2)),
            vec![new_line(1, 100), new_line(2, 200)],
            FulfillmentStatusId::new(1),
            PaymentStatusId::new(1),
            Utc::now(),
        );
        assert!(lines.iter().all(|l| l.order_id == order.id));
        assert_eq!(order.payment_method_type_id, Some(PaymentMethodTypeId::new(2)));
    }

    #[test]
    fn test_empty_order_total_is_zero() {
        assert_eq!(order_total(&[]).cents(), 0);
    }
}
