//! SIMD kernels for quantized A * B^T.
//!
//! Each kernel walks row blocks of A against one row of B at a time,
//! accumulates lane-wise partial products in vector registers, folds them
//! through `crate::reduce`, and hands each scalar total to the output
//! callback. All variants implement the identical contract; the entry
//! points in the crate root pick one at runtime.
//!
//! Available kernels:
//! - `avx512_i16` / `avx2_i16`: 16-bit lanes, 4-row blocking, 32-bit accumulation
//! - `avx512_i8` / `avx2_i8`: 8-bit lanes, 8-row blocking, sign-corrected
//!   unsigned multiply with saturating 16-bit accumulation

pub mod avx2_i8;
pub mod avx2_i16;
pub mod avx512_i8;
pub mod avx512_i16;
