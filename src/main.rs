//! Benchmark runner for the quantized matmul kernels.

use intmatmul::matrix::aligned::AlignedVector;
use intmatmul::matrix::reference::{gemm_i8_reference, gemm_i16_reference};
use intmatmul::{UnquantizeAndWrite, multiply_i8, multiply_i16};
use std::time::Instant;

fn main() {
    println!("=== Quantized Integer Matrix Multiplication Benchmark ===\n");

    let has_avx2 = is_x86_feature_detected!("avx2");
    let has_avx512 =
        is_x86_feature_detected!("avx512f") && is_x86_feature_detected!("avx512bw");
    println!("CPU Features: AVX2={}, AVX-512BW={}\n", has_avx2, has_avx512);

    let sizes = [256, 512, 1024];
    let iterations = 5;

    for &size in &sizes {
        let (num_a_rows, num_b_rows, width) = (size, size, size);
        println!("A: {0}x{2}, B: {1}x{2}", num_a_rows, num_b_rows, width);
        println!("{}", "-".repeat(50));

        // Small repeating values keep the 8-bit path far from saturation.
        let mut a16 = AlignedVector::<i16>::new(num_a_rows * width);
        let mut b16 = AlignedVector::<i16>::new(num_b_rows * width);
        for (i, v) in a16.iter_mut().enumerate() {
            *v = (i % 7) as i16 - 3;
        }
        for (i, v) in b16.iter_mut().enumerate() {
            *v = (i % 5) as i16 - 2;
        }
        let a8 = AlignedVector::from_slice(
            &a16.iter().map(|&v| v as i8).collect::<Vec<_>>(),
        );
        let b8 = AlignedVector::from_slice(
            &b16.iter().map(|&v| v as i8).collect::<Vec<_>>(),
        );

        let mut c = vec![0.0f32; num_a_rows * num_b_rows];
        let ops = 2.0 * (num_a_rows * num_b_rows * width) as f64;

        let secs = bench(iterations, || {
            let cb = UnquantizeAndWrite::new(1.0, c.as_mut_ptr(), num_b_rows);
            unsafe { gemm_i16_reference(&a16, &b16, &cb, num_a_rows, num_b_rows, width) };
        });
        report("Scalar reference i16", secs, ops);

        let secs = bench(iterations, || {
            let cb = UnquantizeAndWrite::new(1.0, c.as_mut_ptr(), num_b_rows);
            unsafe { gemm_i8_reference(&a8, &b8, &cb, num_a_rows, num_b_rows, width) };
        });
        report("Scalar reference i8", secs, ops);

        let secs = bench(iterations, || {
            multiply_i16(&a16, &b16, &mut c, 1.0, num_a_rows, num_b_rows, width);
        });
        report("SIMD i16", secs, ops);

        let secs = bench(iterations, || {
            multiply_i8(&a8, &b8, &mut c, 1.0, num_a_rows, num_b_rows, width);
        });
        report("SIMD i8", secs, ops);

        println!();
    }
}

fn bench<F: FnMut()>(iterations: usize, mut f: F) -> f64 {
    // Warm-up pass.
    f();
    let start = Instant::now();
    for _ in 0..iterations {
        f();
    }
    start.elapsed().as_secs_f64() / iterations as f64
}

fn report(name: &str, secs: f64, ops: f64) {
    println!("{:<24} {:>9.3} ms   {:>7.2} GOPS", name, secs * 1e3, ops / secs / 1e9);
}
