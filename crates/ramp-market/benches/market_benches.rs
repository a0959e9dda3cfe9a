//! Criterion benchmarks for ramp-market settlement.
//!
//! Covers: purchase/sale round trip, transfer, invariant audit, and snapshot
//! on a market with many holders.

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use ramp_core::types::{Address, CurveParams};
use ramp_market::{InMemoryFunds, ManualClock, Market};

fn holder(i: u32) -> Address {
    let mut bytes = [0u8; 20];
    bytes[..4].copy_from_slice(&i.to_be_bytes());
    Address(bytes)
}

fn populated(holders: u32) -> Market {
    let funds = Arc::new(InMemoryFunds::new());
    let clock = Arc::new(ManualClock::new(1_700_000_000));
    let mut market = Market::new(CurveParams::linear(2), funds, clock);
    for i in 0..holders {
        market
            .submit_purchase(holder(i), 10, 1_000_000_000)
            .expect("seed purchase");
    }
    market
}

fn bench_round_trip(c: &mut Criterion) {
    let mut market = populated(1_000);
    let buyer = holder(1_000_000);

    c.bench_function("purchase_sale_round_trip", |b| {
        b.iter(|| {
            market
                .submit_purchase(buyer, black_box(100), 1_000_000_000)
                .expect("purchase");
            market
                .submit_sale(buyer, black_box(100), 0)
                .expect("sale");
        })
    });
}

fn bench_transfer(c: &mut Criterion) {
    let mut market = populated(1_000);

    c.bench_function("transfer", |b| {
        b.iter(|| {
            market.transfer(holder(0), holder(1), black_box(1)).expect("transfer");
            market.transfer(holder(1), holder(0), black_box(1)).expect("transfer");
        })
    });
}

fn bench_check_invariants(c: &mut Criterion) {
    let market = populated(10_000);

    c.bench_function("check_invariants_10k", |b| {
        b.iter(|| market.check_invariants().expect("consistent"))
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let market = populated(10_000);

    c.bench_function("snapshot_10k", |b| {
        b.iter(|| market.snapshot().expect("snapshot"))
    });
}

criterion_group!(
    benches,
    bench_round_trip,
    bench_transfer,
    bench_check_invariants,
    bench_snapshot,
);
criterion_main!(benches);
