use criterion::{Criterion, Throughput, criterion_group, criterion_main};

use queryd_config::{CapacityUnit, parse_capacity};

fn capacity_parsing_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("capacity");
    group.throughput(Throughput::Elements(1));

    group.bench_function("parse_integer_gb", |b| {
        b.iter(|| parse_capacity("10GB", CapacityUnit::Byte).unwrap())
    });

    group.bench_function("parse_fractional_tb", |b| {
        b.iter(|| parse_capacity("1.5TB", CapacityUnit::Megabyte).unwrap())
    });

    group.bench_function("reject_malformed", |b| {
        b.iter(|| parse_capacity("not a capacity", CapacityUnit::Byte).unwrap_err())
    });

    group.finish();
}

criterion_group!(benches, capacity_parsing_benchmark);
criterion_main!(benches);
