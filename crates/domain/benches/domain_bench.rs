use chrono::Utc;
use common::{AddressId, FulfillmentStatusId, Money, PaymentStatusId, ProductId, UserId};
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{NewOrderLine, Order, StockLevel, StockRecord, order_total};

fn bench_stock_level_derivation(c: &mut Criterion) {
    c.bench_function("domain/stock_level_for_quantity", |b| {
        b.iter(|| {
            for quantity in 0..100u32 {
                std::hint::black_box(StockLevel::for_quantity(quantity));
            }
        });
    });
}

fn bench_stock_reserve_release(c: &mut Criterion) {
    c.bench_function("domain/stock_reserve_release", |b| {
        b.iter(|| {
            let mut record = StockRecord::new(ProductId::new(), 1000);
            for _ in 0..100 {
                record.reserve(3).unwrap();
                record.release(3);
            }
            std::hint::black_box(record);
        });
    });
}

fn bench_order_placement(c: &mut Criterion) {
    let lines: Vec<NewOrderLine> = (0..20)
        .map(|i| NewOrderLine {
            product_id: ProductId::new(),
            quantity: i % 5 + 1,
            unit_price: Money::from_cents(i64::from(i) * 100 + 50),
        })
        .collect();

    c.bench_function("domain/order_place_20_lines", |b| {
        b.iter(|| {
            let (order, order_lines) = Order::place(
                UserId::new(),
                AddressId::new(),
                None,
                lines.clone(),
                FulfillmentStatusId::new(1),
                PaymentStatusId::new(1),
                Utc::now(),
            );
            std::hint::black_box((order, order_lines));
        });
    });
}

fn bench_order_total(c: &mut Criterion) {
    let (_, lines) = Order::place(
        UserId::new(),
        AddressId::new(),
        None,
        (0..100)
            .map(|i| NewOrderLine {
                product_id: ProductId::new(),
                quantity: i % 7 + 1,
                unit_price: Money::from_cents(999),
            })
            .collect(),
        FulfillmentStatusId::new(1),
        PaymentStatusId::new(1),
        Utc::now(),
    );

    c.bench_function("domain/order_total_100_lines", |b| {
        b.iter(|| std::hint::black_box(order_total(&lines)));
    });
}

criterion_group!(
    benches,
    bench_stock_level_derivation,
    bench_stock_reserve_release,
    bench_order_placement,
    bench_order_total
);
criterion_main!(benches);
