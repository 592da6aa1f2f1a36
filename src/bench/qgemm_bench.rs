//! Criterion benchmarks: SIMD kernels vs the scalar reference.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use intmatmul::matrix::aligned::AlignedVector;
use intmatmul::matrix::reference::{gemm_i8_reference, gemm_i16_reference};
use intmatmul::{UnquantizeAndWrite, multiply_i8, multiply_i16};

const SIZE: usize = 512;

fn inputs_i16() -> (AlignedVector<i16>, AlignedVector<i16>) {
    let mut a = AlignedVector::new(SIZE * SIZE);
    let mut b = AlignedVector::new(SIZE * SIZE);
    for (i, v) in a.iter_mut().enumerate() {
        *v = (i % 7) as i16 - 3;
    }
    for (i, v) in b.iter_mut().enumerate() {
        *v = (i % 5) as i16 - 2;
    }
    (a, b)
}

fn inputs_i8() -> (AlignedVector<i8>, AlignedVector<i8>) {
    let mut a = AlignedVector::new(SIZE * SIZE);
    let mut b = AlignedVector::new(SIZE * SIZE);
    for (i, v) in a.iter_mut().enumerate() {
        *v = (i % 7) as i8 - 3;
    }
    for (i, v) in b.iter_mut().enumerate() {
        *v = (i % 5) as i8 - 2;
    }
    (a, b)
}

fn bench_i16(c: &mut Criterion) {
    let (a, b) = inputs_i16();
    let mut out = vec![0.0f32; SIZE * SIZE];

    c.bench_function("i16 simd 512", |bench| {
        bench.iter(|| {
            multiply_i16(
                black_box(&a),
                black_box(&b),
                &mut out,
                1.0,
                SIZE,
                SIZE,
                SIZE,
            )
        })
    });

    c.bench_function("i16 scalar 512", |bench| {
        bench.iter(|| {
            let cb = UnquantizeAndWrite::new(1.0, out.as_mut_ptr(), SIZE);
            unsafe { gemm_i16_reference(black_box(&a), black_box(&b), &cb, SIZE, SIZE, SIZE) }
        })
    });
}

fn bench_i8(c: &mut Criterion) {
    let (a, b) = inputs_i8();
    let mut out = vec![0.0f32; SIZE * SIZE];

    c.bench_function("i8 simd 512", |bench| {
        bench.iter(|| {
            multiply_i8(
                black_box(&a),
                black_box(&b),
                &mut out,
                1.0,
                SIZE,
                SIZE,
                SIZE,
            )
        })
    });

    c.bench_function("i8 scalar 512", |bench| {
        bench.iter(|| {
            let cb = UnquantizeAndWrite::new(1.0, out.as_mut_ptr(), SIZE);
            unsafe { gemm_i8_reference(black_box(&a), black_box(&b), &cb, SIZE, SIZE, SIZE) }
        })
    });
}

criterion_group!(benches, bench_i16, bench_i8);
criterion_main!(benches);
