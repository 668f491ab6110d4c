use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fastreflect::{genutil::GenesisState, FastMessage};
use fastreflect_tests::{encoded_genesis_state, genesis_state};
use prost::Message;

const SHAPES: &[(usize, usize)] = &[(1, 16), (16, 256), (256, 1024)];

fn decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for &(count, len) in SHAPES {
        let bytes = encoded_genesis_state(count, len);
        let param = format!("{}x{}", count, len);
        group.throughput(Throughput::Bytes(bytes.len() as u64));

        group.bench_with_input(BenchmarkId::new("fast", &param), &bytes, |b, bytes| {
            b.iter(|| GenesisState::unmarshal(black_box(bytes)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("prost", &param), &bytes, |b, bytes| {
            b.iter(|| GenesisState::decode(black_box(&bytes[..])).unwrap())
        });
    }
    group.finish();
}

fn encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for &(count, len) in SHAPES {
        let message = genesis_state(count, len);
        let param = format!("{}x{}", count, len);
        group.throughput(Throughput::Bytes(message.size() as u64));

        group.bench_with_input(BenchmarkId::new("fast", &param), &message, |b, message| {
            b.iter(|| black_box(message).marshal())
        });
        group.bench_with_input(BenchmarkId::new("prost", &param), &message, |b, message| {
            b.iter(|| black_box(message).encode_to_vec())
        });
    }
    group.finish();
}

criterion_group!(benches, decode, encode);
criterion_main!(benches);
