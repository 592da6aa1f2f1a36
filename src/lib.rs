//! Quantized integer matrix multiplication with AVX2/AVX-512 SIMD.
//!
//! Computes C = A * B^T where A and B hold values already quantized to
//! 16-bit or 8-bit integers, replacing a float GEMM on the hot path of
//! inference workloads. Multiplying against B^T keeps both operands'
//! memory access consecutive; B is typically a weight matrix that was
//! transposed once offline.
//!
//! ## Usage
//!
//! ```
//! use intmatmul::{AlignedVector, multiply_i16};
//!
//! // A: 4x32, B: 1x32, both quantized to i16 and 64-byte aligned.
//! let a = AlignedVector::from_slice(&[1i16; 4 * 32]);
//! let b = AlignedVector::from_slice(&[1i16; 32]);
//! let mut c = vec![0.0f32; 4 * 1];
//!
//! multiply_i16(&a, &b, &mut c, 1.0, 4, 1, 32);
//! assert_eq!(c, vec![32.0; 4]);
//! ```
//!
//! ## What's inside
//!
//! - 16-bit kernels: 4-row register blocking, widening multiply-add,
//!   32-bit accumulation (AVX-512 and AVX2)
//! - 8-bit kernels: 8-row blocking, sign-corrected unsigned multiply,
//!   saturating 16-bit accumulation widened per sweep
//! - Fused horizontal reduction networks (4/2/1 accumulators at a time)
//! - Output callbacks: raw store, dequantize, add bias, or combinations,
//!   monomorphized into the inner loop
//!
//! There is no recoverable-error channel: violated preconditions (bad
//! width multiple, misaligned buffer, wrong slice length) panic via
//! assertions. Validation belongs to the calling layer; these are hot-path
//! primitives. The kernels allocate nothing, keep no state, and only read
//! A/B and write C, so independent calls (or disjoint row ranges) can run
//! on separate threads with no coordination.

pub mod callbacks;
pub mod kernels;
pub mod matrix;
pub mod reduce;

pub use callbacks::{
    AddBiasAndWrite, Discard, OutputCallback, UnquantizeAndAddBiasAndWrite, UnquantizeAndWrite,
    Write,
};
pub use matrix::aligned::AlignedVector;

/// 16-bit multiply: C = unquant_mult * (A * B^T), written as `f32`.
///
/// Picks the fastest available kernel (AVX-512 > AVX2 > scalar). A is
/// `num_a_rows x width`, B is `num_b_rows x width`, C is
/// `num_a_rows x num_b_rows`, all row-major. A and B must be 64-byte
/// aligned (see [`AlignedVector`]) with `width % 32 == 0`.
///
/// # Panics
///
/// Panics if slice lengths, the width multiple, or the alignment don't
/// match the contract.
pub fn multiply_i16(
    a: &[i16],
    b: &[i16],
    c: &mut [f32],
    unquant_mult: f32,
    num_a_rows: usize,
    num_b_rows: usize,
    width: usize,
) {
    assert_eq!(
        c.len(),
        num_a_rows * num_b_rows,
        "C: expected {}x{}={} elements",
        num_a_rows,
        num_b_rows,
        num_a_rows * num_b_rows
    );
    let callback = UnquantizeAndWrite::new(unquant_mult, c.as_mut_ptr(), num_b_rows);
    // Callback bounds hold: every (i, j) maps inside c, checked above.
    unsafe { multiply_i16_with(a, b, &callback, num_a_rows, num_b_rows, width) };
}

/// 8-bit multiply: C = unquant_mult * (A * B^T), written as `f32`.
///
/// Same shape as [`multiply_i16`] with `width % 64 == 0` and `a` lanes in
/// [-127, 127]. The 8-bit kernels accumulate in saturating 16-bit between
/// reductions; pick quantization scales that keep partial sums in range
/// (see the kernel docs), or the result clamps rather than wraps.
///
/// # Panics
///
/// Panics if slice lengths, the width multiple, or the alignment don't
/// match the contract.
pub fn multiply_i8(
    a: &[i8],
    b: &[i8],
    c: &mut [f32],
    unquant_mult: f32,
    num_a_rows: usize,
    num_b_rows: usize,
    width: usize,
) {
    assert_eq!(
        c.len(),
        num_a_rows * num_b_rows,
        "C: expected {}x{}={} elements",
        num_a_rows,
        num_b_rows,
        num_a_rows * num_b_rows
    );
    let callback = UnquantizeAndWrite::new(unquant_mult, c.as_mut_ptr(), num_b_rows);
    unsafe { multiply_i8_with(a, b, &callback, num_a_rows, num_b_rows, width) };
}

/// 16-bit multiply through a caller-supplied output callback.
///
/// This is the seam for bias and raw-integer outputs: build one of the
/// [`callbacks`] parameter bundles and the kernel monomorphizes it into
/// its inner loop.
///
/// # Safety
///
/// The callback holds raw pointers; the caller must guarantee every cell
/// of `num_a_rows x num_b_rows` (and column index for bias) is in bounds
/// for the buffers it was built with, and that those buffers don't alias
/// A or B.
pub unsafe fn multiply_i16_with<C: OutputCallback>(
    a: &[i16],
    b: &[i16],
    callback: &C,
    num_a_rows: usize,
    num_b_rows: usize,
    width: usize,
) {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx512f") && is_x86_feature_detected!("avx512bw") {
            unsafe {
                kernels::avx512_i16::gemm_i16_avx512(a, b, callback, num_a_rows, num_b_rows, width)
            };
            return;
        }
        if is_x86_feature_detected!("avx2") {
            unsafe {
                kernels::avx2_i16::gemm_i16_avx2(a, b, callback, num_a_rows, num_b_rows, width)
            };
            return;
        }
    }

    unsafe {
        matrix::reference::gemm_i16_reference(a, b, callback, num_a_rows, num_b_rows, width)
    };
}

/// 8-bit multiply through a caller-supplied output callback.
///
/// # Safety
///
/// As [`multiply_i16_with`].
pub unsafe fn multiply_i8_with<C: OutputCallback>(
    a: &[i8],
    b: &[i8],
    callback: &C,
    num_a_rows: usize,
    num_b_rows: usize,
    width: usize,
) {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx512f") && is_x86_feature_detected!("avx512bw") {
            unsafe {
                kernels::avx512_i8::gemm_i8_avx512(a, b, callback, num_a_rows, num_b_rows, width)
            };
            return;
        }
        if is_x86_feature_detected!("avx2") {
            unsafe { kernels::avx2_i8::gemm_i8_avx2(a, b, callback, num_a_rows, num_b_rows, width) };
            return;
        }
    }

    unsafe { matrix::reference::gemm_i8_reference(a, b, callback, num_a_rows, num_b_rows, width) };
}
