use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rangedex::math::{
    compute_next_price, get_amount_0_delta, get_amount_1_delta, tick_to_price,
};

fn amount_deltas_benchmark(c: &mut Criterion) {
    let lower = tick_to_price(-600).unwrap();
    let upper = tick_to_price(600).unwrap();
    c.bench_function("get_amount_0_delta", |b| {
        b.iter(|| black_box(get_amount_0_delta(lower, upper, 1_000_000, true).unwrap()))
    });
    c.bench_function("get_amount_1_delta", |b| {
        b.iter(|| black_box(get_amount_1_delta(lower, upper, 1_000_000, false).unwrap()))
    });
}

fn compute_next_price_benchmark(c: &mut Criterion) {
    let price = tick_to_price(0).unwrap();
    c.bench_function("compute_next_price", |b| {
        b.iter(|| black_box(compute_next_price(price, 1_000_000, 5000, true, true).unwrap()))
    });
}

criterion_group!(benches, amount_deltas_benchmark, compute_next_price_benchmark);
criterion_main!(benches);
