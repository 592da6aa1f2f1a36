//! 16-bit AVX2 GEMM kernel.
//!
//! Same algorithm as the AVX-512 kernel at half the register width: the
//! public contract (width multiple of 32, 64-byte alignment) is identical,
//! this variant just walks twice as many 256-bit registers per row.

use std::arch::x86_64::*;

use crate::callbacks::OutputCallback;
use crate::reduce::avx2::{reduce32_x1, reduce32_x4};

/// Computes C = A * B^T over 16-bit quantized lanes.
///
/// See [`crate::kernels::avx512_i16::gemm_i16_avx512`] for the algorithm;
/// 4-row blocking, widening `madd` accumulation, quad reductions.
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports AVX2 (checked via `#[target_feature]`)
/// - `a` and `b` base pointers are 64-byte aligned (asserted)
/// - `width % 32 == 0` and slice lengths match the dimensions (asserted)
/// - every cell of `num_a_rows x num_b_rows` is in bounds for the buffers
///   `callback` writes
#[target_feature(enable = "avx2")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn gemm_i16_avx2<C: OutputCallback>(
    a: &[i16],
    b: &[i16],
    callback: &C,
    num_a_rows: usize,
    num_b_rows: usize,
    width: usize,
) {
    assert_eq!(width % 32, 0, "width must be a multiple of 32");
    assert_eq!(a.len(), num_a_rows * width);
    assert_eq!(b.len(), num_b_rows * width);
    assert_eq!(a.as_ptr() as usize % 64, 0, "A must be 64-byte aligned");
    assert_eq!(b.as_ptr() as usize % 64, 0, "B must be 64-byte aligned");

    let simd_width = width / 16;
    let a = a.as_ptr() as *const __m256i;
    let b = b.as_ptr() as *const __m256i;

    let unroll_rows = num_a_rows & !3;
    for i in (0..unroll_rows).step_by(4) {
        let a1_row = a.add(i * simd_width);
        let a2_row = a.add((i + 1) * simd_width);
        let a3_row = a.add((i + 2) * simd_width);
        let a4_row = a.add((i + 3) * simd_width);

        for j in 0..num_b_rows {
            let b_row = b.add(j * simd_width);

            let mut sum1 = _mm256_setzero_si256();
            let mut sum2 = _mm256_setzero_si256();
            let mut sum3 = _mm256_setzero_si256();
            let mut sum4 = _mm256_setzero_si256();

            for k in 0..simd_width {
                let b_k = _mm256_load_si256(b_row.add(k));

                sum1 = _mm256_add_epi32(
                    sum1,
                    _mm256_madd_epi16(b_k, _mm256_load_si256(a1_row.add(k))),
                );
                sum2 = _mm256_add_epi32(
                    sum2,
                    _mm256_madd_epi16(b_k, _mm256_load_si256(a2_row.add(k))),
                );
                sum3 = _mm256_add_epi32(
                    sum3,
                    _mm256_madd_epi16(b_k, _mm256_load_si256(a3_row.add(k))),
                );
                sum4 = _mm256_add_epi32(
                    sum4,
                    _mm256_madd_epi16(b_k, _mm256_load_si256(a4_row.add(k))),
                );
            }
            callback.write_quad(reduce32_x4(sum1, sum2, sum3, sum4), i, j);
        }
    }

    for i in unroll_rows..num_a_rows {
        let a1_row = a.add(i * simd_width);
        for j in 0..num_b_rows {
            let b_row = b.add(j * simd_width);
            let mut sum1 = _mm256_setzero_si256();
            for k in 0..simd_width {
                let b_k = _mm256_load_si256(b_row.add(k));
                sum1 = _mm256_add_epi32(
                    sum1,
                    _mm256_madd_epi16(b_k, _mm256_load_si256(a1_row.add(k))),
                );
            }
            callback.write(reduce32_x1(sum1), i, j);
        }
    }
}
