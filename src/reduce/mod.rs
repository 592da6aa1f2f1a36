//! Horizontal reduction networks.
//!
//! The kernels leave each dot product spread across the lanes of one wide
//! accumulator register. These routines fold 1, 2 or 4 accumulators down to
//! one scalar total each, using pairwise interleave-and-add so the shuffle
//! cost is shared across accumulators. The 16-bit entry points first widen
//! every lane to 32 bits (multiply-by-one horizontal add) so no sign or
//! magnitude is lost.
//!
//! Output order always matches accumulator order.

pub mod avx2;
pub mod avx512;
