//! 8-bit AVX2 GEMM kernel.
//!
//! Same structure as the AVX-512 kernel. AVX2 has no mask registers, so
//! the sign correction uses the byte-sign instruction instead: `sign_epi8`
//! negates A's lanes where B is negative and zeroes them where B is zero -
//! harmless, since `|B|` is zero in those lanes and the product is zero
//! either way. Mathematically the same signed x signed multiply.

use std::arch::x86_64::*;

use crate::callbacks::OutputCallback;
use crate::reduce::avx2::{reduce16to32_x1, reduce16to32_x2, reduce16to32_x4};

/// One sign-corrected multiply-accumulate step.
#[inline]
#[target_feature(enable = "avx2")]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn accum(a: __m256i, b: __m256i, b_positive: __m256i, sum: &mut __m256i) {
    let a_signed = _mm256_sign_epi8(a, b);
    let multiplied = _mm256_maddubs_epi16(b_positive, a_signed);
    *sum = _mm256_adds_epi16(*sum, multiplied);
}

/// Computes C = A * B^T over 8-bit quantized lanes.
///
/// See [`crate::kernels::avx512_i8::gemm_i8_avx512`] for the blocking and
/// tail scheme; contract is identical, including the `a` lanes in
/// [-127, 127] requirement.
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports AVX2 (checked via `#[target_feature]`)
/// - `a` and `b` base pointers are 64-byte aligned (asserted)
/// - `width % 64 == 0` and slice lengths match the dimensions (asserted)
/// - every cell of `num_a_rows x num_b_rows` is in bounds for the buffers
///   `callback` writes
#[target_feature(enable = "avx2")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn gemm_i8_avx2<C: OutputCallback>(
    a: &[i8],
    b: &[i8],
    callback: &C,
    num_a_rows: usize,
    num_b_rows: usize,
    width: usize,
) {
    assert_eq!(width % 64, 0, "width must be a multiple of 64");
    assert_eq!(a.len(), num_a_rows * width);
    assert_eq!(b.len(), num_b_rows * width);
    assert_eq!(a.as_ptr() as usize % 64, 0, "A must be 64-byte aligned");
    assert_eq!(b.as_ptr() as usize % 64, 0, "B must be 64-byte aligned");

    let simd_width = width / 32;
    let a = a.as_ptr() as *const __m256i;
    let b = b.as_ptr() as *const __m256i;

    let full_blocks = num_a_rows & !7;
    for i in (0..full_blocks).step_by(8) {
        row_block::<8, C>(a, b, callback, i, num_b_rows, simd_width);
    }

    let i = full_blocks;
    match num_a_rows & 7 {
        1 => row_block::<1, C>(a, b, callback, i, num_b_rows, simd_width),
        2 => row_block::<2, C>(a, b, callback, i, num_b_rows, simd_width),
        3 => row_block::<3, C>(a, b, callback, i, num_b_rows, simd_width),
        4 => row_block::<4, C>(a, b, callback, i, num_b_rows, simd_width),
        5 => row_block::<5, C>(a, b, callback, i, num_b_rows, simd_width),
        6 => row_block::<6, C>(a, b, callback, i, num_b_rows, simd_width),
        7 => row_block::<7, C>(a, b, callback, i, num_b_rows, simd_width),
        _ => {}
    }
}

/// Multiplies `ROWS` rows of A (1..=8) against every row of B.
#[inline]
#[target_feature(enable = "avx2")]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn row_block<const ROWS: usize, C: OutputCallback>(
    a: *const __m256i,
    b: *const __m256i,
    callback: &C,
    first_row: usize,
    num_b_rows: usize,
    simd_width: usize,
) {
    let a_rows: [*const __m256i; ROWS] =
        core::array::from_fn(|r| unsafe { a.add((first_row + r) * simd_width) });

    for j in 0..num_b_rows {
        let b_row = b.add(j * simd_width);
        let mut sums = [_mm256_setzero_si256(); ROWS];

        for k in 0..simd_width {
            let b_k = _mm256_load_si256(b_row.add(k));
            let b_positive = _mm256_abs_epi8(b_k);
            for r in 0..ROWS {
                let a_k = _mm256_load_si256(a_rows[r].add(k));
                accum(a_k, b_k, b_positive, &mut sums[r]);
            }
        }

        let mut r = 0;
        while r + 4 <= ROWS {
            let quad = reduce16to32_x4(sums[r], sums[r + 1], sums[r + 2], sums[r + 3]);
            callback.write_quad(quad, first_row + r, j);
            r += 4;
        }
        if ROWS - r >= 2 {
            let pair = reduce16to32_x2(sums[r], sums[r + 1]);
            callback.write_pair(pair, first_row + r, j);
            r += 2;
        }
        if ROWS - r == 1 {
            callback.write(reduce16to32_x1(sums[r]), first_row + r, j);
        }
    }
}
