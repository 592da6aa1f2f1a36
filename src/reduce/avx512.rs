//! AVX-512 accumulator reductions.

use std::arch::x86_64::*;

/// Widens 16-bit partial sums to 32-bit lanes, pairwise.
///
/// Multiply-by-one horizontal add: each pair of adjacent 16-bit lanes
/// becomes one sign-correct 32-bit lane. Which lanes get paired doesn't
/// matter - everything is summed afterwards anyway. This formulation
/// beat sign-extension-and-fold and shift-based sign extension.
#[inline]
#[target_feature(enable = "avx512f", enable = "avx512bw")]
pub unsafe fn widen32(sum: __m512i) -> __m512i {
    _mm512_madd_epi16(sum, _mm512_set1_epi16(1))
}

/// Folds the two 256-bit halves of a register into one.
#[inline]
#[target_feature(enable = "avx512f")]
unsafe fn fold512(sum: __m512i) -> __m256i {
    _mm256_add_epi32(
        _mm512_castsi512_si256(sum),
        _mm512_extracti64x4_epi64::<1>(sum),
    )
}

/// Folds the two 128-bit halves of a register into one.
#[inline]
#[target_feature(enable = "avx512f")]
unsafe fn fold256(sum: __m256i) -> __m128i {
    _mm_add_epi32(
        _mm256_castsi256_si128(sum),
        _mm256_extracti128_si256::<1>(sum),
    )
}

/// Reduces four 32-bit accumulators to `[sum(s1), sum(s2), sum(s3), sum(s4)]`.
///
/// One fused interleave network instead of four independent reductions:
/// the unpack-and-add steps interleave lanes of different accumulators so
/// every add retires lanes of all four at once.
#[inline]
#[target_feature(enable = "avx512f")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn reduce32_x4(s1: __m512i, s2: __m512i, s3: __m512i, s4: __m512i) -> [i32; 4] {
    // 1 2 1 2 1 2 1 2 ...
    let pack12 = _mm512_add_epi32(_mm512_unpackhi_epi32(s1, s2), _mm512_unpacklo_epi32(s1, s2));
    // 3 4 3 4 3 4 3 4 ...
    let pack34 = _mm512_add_epi32(_mm512_unpackhi_epi32(s3, s4), _mm512_unpacklo_epi32(s3, s4));
    // 1 2 3 4 1 2 3 4 ...
    let pack1234 =
        _mm512_add_epi32(_mm512_unpackhi_epi64(pack12, pack34), _mm512_unpacklo_epi64(pack12, pack34));
    // Halve the register twice: 1 2 3 4 remain.
    core::mem::transmute::<__m128i, [i32; 4]>(fold256(fold512(pack1234)))
}

/// Reduces two 32-bit accumulators to `[sum(s1), sum(s2)]`.
#[inline]
#[target_feature(enable = "avx512f")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn reduce32_x2(s1: __m512i, s2: __m512i) -> [i32; 2] {
    // 1 2 1 2 1 2 1 2 ...
    let pack12 = _mm512_add_epi32(_mm512_unpackhi_epi32(s1, s2), _mm512_unpacklo_epi32(s1, s2));
    // 1 2 1 2
    let quad = core::mem::transmute::<__m128i, [i32; 4]>(fold256(fold512(pack12)));
    [quad[0] + quad[2], quad[1] + quad[3]]
}

/// Reduces one 32-bit accumulator to its lane sum.
#[inline]
#[target_feature(enable = "avx512f")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn reduce32_x1(sum: __m512i) -> i32 {
    let quad = core::mem::transmute::<__m128i, [i32; 4]>(fold256(fold512(sum)));
    quad[0] + quad[1] + quad[2] + quad[3]
}

/// Reduces four saturating 16-bit accumulators: widen, then [`reduce32_x4`].
#[inline]
#[target_feature(enable = "avx512f", enable = "avx512bw")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn reduce16to32_x4(s1: __m512i, s2: __m512i, s3: __m512i, s4: __m512i) -> [i32; 4] {
    reduce32_x4(widen32(s1), widen32(s2), widen32(s3), widen32(s4))
}

/// Reduces two saturating 16-bit accumulators.
#[inline]
#[target_feature(enable = "avx512f", enable = "avx512bw")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn reduce16to32_x2(s1: __m512i, s2: __m512i) -> [i32; 2] {
    reduce32_x2(widen32(s1), widen32(s2))
}

/// Reduces one saturating 16-bit accumulator.
#[inline]
#[target_feature(enable = "avx512f", enable = "avx512bw")]
#[allow(unsafe_op_in_unsafe_fn)]
pub unsafe fn reduce16to32_x1(sum: __m512i) -> i32 {
    reduce32_x1(widen32(sum))
}
