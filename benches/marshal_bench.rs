//! Benchmarks for string marshaling and foreign array access

use cimgui_interop::marshal::{from_foreign, to_foreign, with_foreign_str};
use cimgui_interop::view::{DynamicArrayHeader, NativeHandle, NativeVector};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

/// Outgoing strings on both sides of the stack threshold
fn bench_with_foreign_str(c: &mut Criterion) {
    let mut group = c.benchmark_group("with_foreign_str");

    for &len in &[8usize, 256, 2047, 8192] {
        let text = "a".repeat(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_function(format!("{}_bytes", len), |b| {
            b.iter(|| with_foreign_str(black_box(&text), |ptr| black_box(ptr).is_null()))
        });
    }

    group.finish();
}

/// Incoming NUL-terminated strings
fn bench_from_foreign(c: &mut Criterion) {
    let label = to_foreign("##DockSpace_Viewport_11111111");
    let unicode = to_foreign(&"héllo wörld ".repeat(32));

    c.bench_function("from_foreign_label", |b| {
        b.iter(|| unsafe { from_foreign(black_box(label.as_ptr()), None) })
    });
    c.bench_function("from_foreign_unicode", |b| {
        b.iter(|| unsafe { from_foreign(black_box(unicode.as_ptr()), None) })
    });
}

/// Live iteration versus a snapshot copy
fn bench_vector(c: &mut Criterion) {
    let mut storage: Vec<u16> = (0..4096).map(|i| i as u16).collect();
    let mut header = DynamicArrayHeader {
        size: storage.len() as i32,
        capacity: storage.len() as i32,
        data: NativeHandle::from_ptr(storage.as_mut_ptr()),
    };
    let vector: NativeVector<u16> = unsafe { NativeVector::from_header_ptr(&mut header) };

    let mut group = c.benchmark_group("native_vector");
    group.throughput(Throughput::Elements(storage.len() as u64));
    group.bench_function("iter_sum", |b| {
        b.iter(|| vector.iter().map(u32::from).sum::<u32>())
    });
    group.bench_function("snapshot", |b| b.iter(|| black_box(vector.snapshot())));
    group.finish();
}

criterion_group!(benches, bench_with_foreign_str, bench_from_foreign, bench_vector);
criterion_main!(benches);
