//! 8-bit AVX-512 GEMM kernel.
//!
//! The byte multiply-accumulate (`maddubs`) treats its first operand as
//! unsigned, but both quantized matrices are signed. The fix: feed it
//! `|B|` and move B's sign onto A first (conditional negate under B's
//! negative-lane mask). Subtraction-under-mask won the benchmark against
//! the byte-sign-instruction and xor-plus-one formulations.
//!
//! `maddubs` leaves 16-bit pair sums, accumulated with *saturating* adds:
//! if a caller's value ranges push a running sum past i16 range it clamps
//! instead of wrapping, bounding the error. The reduction to 32-bit
//! happens once per (row block, B row) sweep.

use std::arch::x86_64::*;

use crate::callbacks::OutputCallback;
use crate::reduce::avx512::{reduce16to32_x1, reduce16to32_x2, reduce16to32_x4};

/// One sign-corrected multiply-accumulate step.
#[inline]
#[target_feature(enable = "avx512f", enable = "avx512bw")]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn accum(
    zeros: __m512i,
    a: __m512i,
    b_positive: __m512i,
    neg_mask: __mmask64,
    sum: &mut __m512i,
) {
    // Restore the sign B lost to abs: negate A wherever B was negative.
    let a_signed = _mm512_mask_sub_epi8(a, neg_mask, zeros, a);
    // Unsigned |B| x signed A, horizontal add into 16-bit pair sums.
    let multiplied = _mm512_maddubs_epi16(b_positive, a_signed);
    *sum = _mm512_adds_epi16(*sum, multiplied);
}

/// Computes C = A * B^T over 8-bit quantized lanes.
///
/// Row blocking is 8 wide: byte lanes halve the register cost per row, so
/// twice as many accumulators fit as in the 16-bit kernel, and each loaded
/// (and sign-decomposed) B register is reused across 8 A rows. The
/// remainder rows run through the same block routine with fewer live
/// accumulators - one parameterized body instead of seven near-copies.
///
/// Accepts any `num_a_rows >= 1` and `num_b_rows >= 1`; the quad and pair
/// writes batch rows within one block, never columns, so no row-multiple
/// requirement leaks into the contract. Each output cell is written
/// exactly once.
///
/// `a` lanes must stay in [-127, 127]: -128 has no positive negation, so
/// the sign correction cannot represent it.
///
/// # Safety
///
/// Caller must ensure:
/// - CPU supports AVX-512F and AVX-512BW (checked via `#[target_feature]`)
/// - `a` and `b` base pointers are 64-byte aligned (asserted)
/// - `width % 64 == 0` and slice lengths match the dimensions (asserted)
/// - every cell of `num_a_rows x num_b_rows` is in bounds for the buffers
///   `callback` writes
#[target_feature(enable = "avx512f", enable = "avx512bw")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn gemm_i8_avx512<C: OutputCallback>(
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

    let simd_width = width / 64;
    let a = a.as_ptr() as *const __m512i;
    let b = b.as_ptr() as *const __m512i;

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
///
/// `ROWS` is the number of live accumulators; the loop bodies unroll at
/// monomorphization. Results are packed into the fewest reductions that
/// cover the block: quads, then a pair, then a single.
#[inline]
#[target_feature(enable = "avx512f", enable = "avx512bw")]
#[allow(unsafe_op_in_unsafe_fn)]
unsafe fn row_block<const ROWS: usize, C: OutputCallback>(
    a: *const __m512i,
    b: *const __m512i,
    callback: &C,
    first_row: usize,
    num_b_rows: usize,
    simd_width: usize,
) {
    let zeros = _mm512_setzero_si512();
    let a_rows: [*const __m512i; ROWS] =
        core::array::from_fn(|r| unsafe { a.add((first_row + r) * simd_width) });

    for j in 0..num_b_rows {
        let b_row = b.add(j * simd_width);
        let mut sums = [zeros; ROWS];

        for k in 0..simd_width {
            let b_k = _mm512_load_si512(b_row.add(k).cast());
            let b_positive = _mm512_abs_epi8(b_k);
            // One sign decomposition of B, reused for all ROWS multiplies.
            let neg_mask = _mm512_test_epi8_mask(b_k, _mm512_set1_epi8(-128));
            for r in 0..ROWS {
                let a_k = _mm512_load_si512(a_rows[r].add(k).cast());
                accum(zeros, a_k, b_positive, neg_mask, &mut sums[r]);
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
