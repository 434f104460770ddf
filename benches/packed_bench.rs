//! Benchmarks for packed integer array access paths
//!
//! Measures the costs the storage layer cares about: single-index get/set,
//! bulk get/set through the codec, range fill, and streaming
//! serialization/deserialization.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use packora::io::{SliceDataInput, VecDataOutput};
use packora::packed::{
    max_value, Format, Packed64, Packed64SingleBlock, PackedMutable, PackedReader,
    PackedReaderIterator, PackedWriter, VERSION_CURRENT,
};

const SIZE: usize = 100_000;

fn test_values(bits: u32, size: usize) -> Vec<u64> {
    let mask = max_value(bits);
    (0..size as u64)
        .map(|i| i.wrapping_mul(0x9E3779B97F4A7C15) & mask)
        .collect()
}

fn benchmark_single_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_access");
    group.throughput(Throughput::Elements(SIZE as u64));

    for &bits in &[3u32, 8, 21, 33] {
        let values = test_values(bits, SIZE);

        group.bench_with_input(BenchmarkId::new("packed64_set", bits), &bits, |b, _| {
            b.iter(|| {
                let mut arr = Packed64::new(SIZE, bits);
                for (i, &v) in values.iter().enumerate() {
                    arr.set(i, v);
                }
                black_box(arr)
            })
        });

        let mut arr = Packed64::new(SIZE, bits);
        for (i, &v) in values.iter().enumerate() {
            arr.set(i, v);
        }
        group.bench_with_input(BenchmarkId::new("packed64_get", bits), &bits, |b, _| {
            b.iter(|| {
                let mut sum = 0u64;
                for i in 0..SIZE {
                    sum = sum.wrapping_add(arr.get(i));
                }
                black_box(sum)
            })
        });
    }

    for &bits in &[3u32, 8, 21] {
        let values = test_values(bits, SIZE);
        let mut arr = Packed64SingleBlock::create(SIZE, bits).unwrap();
        for (i, &v) in values.iter().enumerate() {
            arr.set(i, v);
        }
        group.bench_with_input(
            BenchmarkId::new("single_block_get", bits),
            &bits,
            |b, _| {
                b.iter(|| {
                    let mut sum = 0u64;
                    for i in 0..SIZE {
                        sum = sum.wrapping_add(arr.get(i));
                    }
                    black_box(sum)
                })
            },
        );
    }

    group.finish();
}

fn benchmark_bulk_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("bulk_access");
    group.throughput(Throughput::Elements(SIZE as u64));

    for &bits in &[3u32, 8, 21, 33] {
        let values = test_values(bits, SIZE);

        group.bench_with_input(BenchmarkId::new("packed64_set_bulk", bits), &bits, |b, _| {
            b.iter(|| {
                let mut arr = Packed64::new(SIZE, bits);
                arr.set_bulk(0, &values);
                black_box(arr)
            })
        });

        let mut arr = Packed64::new(SIZE, bits);
        arr.set_bulk(0, &values);
        let mut buf = vec![0u64; SIZE];
        group.bench_with_input(BenchmarkId::new("packed64_get_bulk", bits), &bits, |b, _| {
            b.iter(|| {
                arr.get_bulk(0, &mut buf);
                black_box(buf[SIZE - 1])
            })
        });
    }

    group.finish();
}

fn benchmark_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");
    group.throughput(Throughput::Elements(SIZE as u64));

    for &bits in &[3u32, 21] {
        group.bench_with_input(BenchmarkId::new("packed64", bits), &bits, |b, _| {
            let mut arr = Packed64::new(SIZE, bits);
            let val = max_value(bits);
            b.iter(|| {
                arr.fill(1, SIZE - 1, black_box(val));
            })
        });

        group.bench_with_input(BenchmarkId::new("single_block", bits), &bits, |b, _| {
            let mut arr = Packed64SingleBlock::create(SIZE, bits).unwrap();
            let val = max_value(bits);
            b.iter(|| {
                arr.fill(1, SIZE - 1, black_box(val));
            })
        });
    }

    group.finish();
}

fn benchmark_streaming(c: &mut Criterion) {
    let mut group = c.benchmark_group("streaming");
    group.throughput(Throughput::Elements(SIZE as u64));

    let bits = 13;
    let values = test_values(bits, SIZE);

    group.bench_function("write", |b| {
        b.iter(|| {
            let out = VecDataOutput::with_capacity(SIZE * 2);
            let mut writer =
                PackedWriter::new(out, Format::Packed, SIZE, bits, 4096).unwrap();
            for &v in &values {
                writer.add(v).unwrap();
            }
            writer.finish().unwrap();
            black_box(writer.into_inner().into_vec())
        })
    });

    let out = VecDataOutput::new();
    let mut writer = PackedWriter::new(out, Format::Packed, SIZE, bits, 4096).unwrap();
    for &v in &values {
        writer.add(v).unwrap();
    }
    writer.finish().unwrap();
    let bytes = writer.into_inner().into_vec();

    group.bench_function("read", |b| {
        b.iter(|| {
            let input = SliceDataInput::new(&bytes);
            let mut reader = PackedReaderIterator::new(
                input,
                Format::Packed,
                VERSION_CURRENT,
                SIZE,
                bits,
                4096,
            )
            .unwrap();
            let mut sum = 0u64;
            for _ in 0..SIZE {
                sum = sum.wrapping_add(reader.next().unwrap());
            }
            black_box(sum)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_access,
    benchmark_bulk_access,
    benchmark_fill,
    benchmark_streaming
);
criterion_main!(benches);
