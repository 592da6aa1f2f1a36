//! Scalar reference GEMM: C = A * B^T through an output callback.
//!
//! Same contract as the SIMD kernels, one multiply at a time. These are the
//! correctness baselines for the tests and the dispatch fallback on CPUs
//! without AVX2. Dot products are exact in 32-bit arithmetic; the 8-bit
//! SIMD path's intermediate 16-bit saturation is not modeled here, which
//! only matters for inputs that violate the no-saturation contract anyway.

use crate::callbacks::OutputCallback;

/// Scalar 16-bit GEMM, `callback(sum_k A[i,k] * B[j,k])` for every (i, j).
///
/// # Safety
///
/// Every (row, col) in `num_a_rows x num_b_rows` must be in bounds for the
/// buffers `callback` writes.
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn gemm_i16_reference<C: OutputCallback>(
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

    for i in 0..num_a_rows {
        for j in 0..num_b_rows {
            let mut total = 0i32;
            for k in 0..width {
                total += a[i * width + k] as i32 * b[j * width + k] as i32;
            }
            callback.write(total, i, j);
        }
    }
}

/// Scalar 8-bit GEMM. Contract matches [`gemm_i16_reference`] with the
/// 8-bit width multiple.
///
/// # Safety
///
/// As [`gemm_i16_reference`].
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn gemm_i8_reference<C: OutputCallback>(
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

    for i in 0..num_a_rows {
        for j in 0..num_b_rows {
            let mut total = 0i32;
            for k in 0..width {
                total += a[i * width + k] as i32 * b[j * width + k] as i32;
            }
            callback.write(total, i, j);
        }
    }
}
