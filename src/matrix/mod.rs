//! Buffer utilities and scalar reference implementations.
//!
//! The SIMD kernels demand 64-byte-aligned inputs, so callers need an
//! allocator that guarantees it - that's [`aligned::AlignedVector`]. The
//! [`reference`] module holds the scalar baselines the kernels are tested
//! against, which double as the fallback on CPUs without AVX2.

pub mod aligned;
pub mod reference;
