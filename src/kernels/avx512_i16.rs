//! 16-bit AVX-512 GEMM kernel.

use std::arch::x86_64::*;

use crate::callbacks::OutputCallback;
use crate::reduce::avx512::{reduce32_x1, reduce32_x4};

/// Computes C = A * B^T over 16-bit quantized lanes.
///
/// Rows of A are processed in blocks of 4 so one loaded B register is
/// reused against four accumulators before it leaves the register file -
/// B is the larger, reused operand, so its per-row cost is what matters.
/// `madd` widens each multiply to 32-bit immediately (adjacent 16-bit
/// products pair-summed into one 32-bit lane), so the k-loop accumulates
/// in plain 32-bit adds with no narrow intermediate.
///
/// Each reduced total is handed to `callback` exactly once as C\[i, j\].
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports AVX-512F and AVX-512BW (checked via `#[target_feature]`)
/// - `a` and `b` base pointers are 64-byte aligned (asserted)
/// - `width % 32 == 0` and slice lengths match the dimensions (asserted)
/// - every cell of `num_a_rows x num_b_rows` is in bounds for the buffers
///   `callback` writes
#[target_feature(enable = "avx512f", enable = "avx512bw")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn gemm_i16_avx512<C: OutputCallback>(
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

    let simd_width = width / 32;
    let a = a.as_ptr() as *const __m512i;
    let b = b.as_ptr() as *const __m512i;

    // Round down to a multiple of 4.
    let unroll_rows = num_a_rows & !3;
    for i in (0..unroll_rows).step_by(4) {
        let a1_row = a.add(i * simd_width);
        let a2_row = a.add((i + 1) * simd_width);
        let a3_row = a.add((i + 2) * simd_width);
        let a4_row = a.add((i + 3) * simd_width);

        for j in 0..num_b_rows {
            let b_row = b.add(j * simd_width);

            let mut sum1 = _mm512_setzero_si512();
            let mut sum2 = _mm512_setzero_si512();
            let mut sum3 = _mm512_setzero_si512();
            let mut sum4 = _mm512_setzero_si512();

            for k in 0..simd_width {
                let b_k = _mm512_load_si512(b_row.add(k).cast());

                sum1 = _mm512_add_epi32(
                    sum1,
                    _mm512_madd_epi16(b_k, _mm512_load_si512(a1_row.add(k).cast())),
                );
                sum2 = _mm512_add_epi32(
                    sum2,
                    _mm512_madd_epi16(b_k, _mm512_load_si512(a2_row.add(k).cast())),
                );
                sum3 = _mm512_add_epi32(
                    sum3,
                    _mm512_madd_epi16(b_k, _mm512_load_si512(a3_row.add(k).cast())),
                );
                sum4 = _mm512_add_epi32(
                    sum4,
                    _mm512_madd_epi16(b_k, _mm512_load_si512(a4_row.add(k).cast())),
                );
            }
            callback.write_quad(reduce32_x4(sum1, sum2, sum3, sum4), i, j);
        }
    }

    // Leftover rows, one at a time.
    // TODO: dedicated 2- and 3-row paths to keep B reuse on the remainder.
    for i in unroll_rows..num_a_rows {
        let a1_row = a.add(i * simd_width);
        for j in 0..num_b_rows {
            let b_row = b.add(j * simd_width);
            let mut sum1 = _mm512_setzero_si512();
            for k in 0..simd_width {
                let b_k = _mm512_load_si512(b_row.add(k).cast());
                sum1 = _mm512_add_epi32(
                    sum1,
                    _mm512_madd_epi16(b_k, _mm512_load_si512(a1_row.add(k).cast())),
                );
            }
            callback.write(reduce32_x1(sum1), i, j);
        }
    }
}
