use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use xcmc_builder::XcmBuilder;
use xcmc_spec::{AssetFilter, Junction, Location, Program, TransferType, Validator};

fn hops(depth: usize) -> XcmBuilder {
    let mut builder = XcmBuilder::using_context(Location::with_junction(0, Junction::Parachain(2004)).unwrap())
        .define_asset("NATIVE", Location::here())
        .unwrap()
        .withdraw_asset("NATIVE", 1_000)
        .unwrap()
        .pay_fees_with("NATIVE")
        .unwrap();
    for _ in 0..depth {
        builder = builder
            .set_next_hop(Location::with_junction(1, Junction::Parachain(2000)).unwrap())
            .unwrap()
            .initiate_transfer(TransferType::Teleport, AssetFilter::all(), false)
            .unwrap();
    }
    builder
}

fn bench_finalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("finalize");
    for depth in [1usize, 4, 8] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let builder = hops(depth);
            b.iter(|| black_box(builder.clone().finalize().unwrap()));
        });
    }
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let program: Program = hops(8).finalize().unwrap();
    let validator = Validator::default();
    c.bench_function("validate_depth_8", |b| {
        b.iter(|| validator.validate(black_box(&program)).unwrap())
    });
}

criterion_group!(benches, bench_finalize, bench_validate);
criterion_main!(benches);
