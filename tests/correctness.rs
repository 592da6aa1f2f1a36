use intmatmul::matrix::aligned::AlignedVector;
use intmatmul::{
    AddBiasAndWrite, Discard, OutputCallback, UnquantizeAndAddBiasAndWrite, UnquantizeAndWrite,
    Write, multiply_i8, multiply_i8_with, multiply_i16, multiply_i16_with,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;

/// Exact reference: every dot product in i64, no SIMD, no blocking.
fn exact_dot_products<T: Copy + Into<i64>>(
    a: &[T],
    b: &[T],
    num_a_rows: usize,
    num_b_rows: usize,
    width: usize,
) -> Vec<i64> {
    let mut c = vec![0i64; num_a_rows * num_b_rows];
    for i in 0..num_a_rows {
        for j in 0..num_b_rows {
            let mut total = 0i64;
            for k in 0..width {
                total += a[i * width + k].into() * b[j * width + k].into();
            }
            c[i * num_b_rows + j] = total;
        }
    }
    c
}

fn random_i16(rng: &mut SmallRng, len: usize, bound: i16) -> AlignedVector<i16> {
    let mut buf = AlignedVector::new(len);
    for v in buf.iter_mut() {
        *v = rng.gen_range(-bound..=bound);
    }
    buf
}

fn random_i8(rng: &mut SmallRng, len: usize, bound: i8) -> AlignedVector<i8> {
    let mut buf = AlignedVector::new(len);
    for v in buf.iter_mut() {
        *v = rng.gen_range(-bound..=bound);
    }
    buf
}

// Every tail branch: 1..9 crosses the 4- and 8-row block boundaries from
// both sides, 16 is two full 8-row blocks.
const A_ROW_CASES: [usize; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 16];
const B_ROW_CASES: [usize; 3] = [1, 4, 8];

// ============================================================
// 16-bit kernel vs exact arithmetic
// ============================================================

#[test]
fn test_i16_matches_exact_dot_product() {
    let mut rng = SmallRng::seed_from_u64(16);

    for width in [32, 64, 96] {
        for num_a_rows in A_ROW_CASES {
            for num_b_rows in B_ROW_CASES {
                let a = random_i16(&mut rng, num_a_rows * width, 512);
                let b = random_i16(&mut rng, num_b_rows * width, 512);
                let mut c = vec![f32::NAN; num_a_rows * num_b_rows];

                multiply_i16(&a, &b, &mut c, 1.0, num_a_rows, num_b_rows, width);

                let exact = exact_dot_products(&a, &b, num_a_rows, num_b_rows, width);
                for (idx, &total) in exact.iter().enumerate() {
                    // Same float op the kernel performs, so equality is exact.
                    let expected = 1.0f32 * total as i32 as f32;
                    assert_eq!(
                        c[idx], expected,
                        "i16 {}x{} width {} cell {}",
                        num_a_rows, num_b_rows, width, idx
                    );
                }
            }
        }
    }
}

#[test]
fn test_i16_unquant_multiplier_applied() {
    let mut rng = SmallRng::seed_from_u64(17);
    let (num_a_rows, num_b_rows, width) = (5, 4, 64);

    let a = random_i16(&mut rng, num_a_rows * width, 100);
    let b = random_i16(&mut rng, num_b_rows * width, 100);
    let mut c = vec![0.0f32; num_a_rows * num_b_rows];

    multiply_i16(&a, &b, &mut c, 0.125, num_a_rows, num_b_rows, width);

    let exact = exact_dot_products(&a, &b, num_a_rows, num_b_rows, width);
    for (idx, &total) in exact.iter().enumerate() {
        assert_eq!(c[idx], 0.125f32 * total as i32 as f32, "cell {}", idx);
    }
}

// ============================================================
// 8-bit kernel vs exact arithmetic
// ============================================================

#[test]
fn test_i8_matches_exact_dot_product() {
    let mut rng = SmallRng::seed_from_u64(8);

    // Lane bound 32 keeps the worst-case 16-bit running sum at
    // 2 * 32 * 32 * (256/32) = 16384, clear of saturation on every ISA.
    for width in [64, 128, 256] {
        for num_a_rows in A_ROW_CASES {
            for num_b_rows in B_ROW_CASES {
                let a = random_i8(&mut rng, num_a_rows * width, 32);
                let b = random_i8(&mut rng, num_b_rows * width, 32);
                let mut c = vec![f32::NAN; num_a_rows * num_b_rows];

                multiply_i8(&a, &b, &mut c, 1.0, num_a_rows, num_b_rows, width);

                let exact = exact_dot_products(&a, &b, num_a_rows, num_b_rows, width);
                for (idx, &total) in exact.iter().enumerate() {
                    let expected = 1.0f32 * total as i32 as f32;
                    assert_eq!(
                        c[idx], expected,
                        "i8 {}x{} width {} cell {}",
                        num_a_rows, num_b_rows, width, idx
                    );
                }
            }
        }
    }
}

// ============================================================
// Concrete scenarios
// ============================================================

#[test]
fn test_i16_ones_times_ones() {
    let a = AlignedVector::from_slice(&[1i16; 4 * 32]);
    let b = AlignedVector::from_slice(&[1i16; 32]);
    let mut c = vec![0.0f32; 4];

    multiply_i16(&a, &b, &mut c, 1.0, 4, 1, 32);

    assert_eq!(c, vec![32.0; 4]);
}

#[test]
fn test_i8_alternating_cancels() {
    let a_vals: Vec<i8> = (0..64).map(|k| if k % 2 == 0 { -1 } else { 1 }).collect();
    let a = AlignedVector::from_slice(&a_vals);
    let b = AlignedVector::from_slice(&[1i8; 64]);
    let mut c = vec![99.0f32; 1];

    multiply_i8(&a, &b, &mut c, 1.0, 1, 1, 64);

    assert_eq!(c[0], 0.0);
}

// ============================================================
// Output policies through the callback seam
// ============================================================

/// A = diag-ish single nonzero lane per row so dot products are known
/// small integers: row i of A has value `totals[i]` in lane 0.
fn single_lane_inputs(totals: &[i32], width: usize) -> (AlignedVector<i16>, AlignedVector<i16>) {
    let mut a = AlignedVector::<i16>::new(totals.len() * width);
    for (i, &t) in totals.iter().enumerate() {
        a[i * width] = t as i16;
    }
    let mut b = AlignedVector::<i16>::new(width);
    b[0] = 1;
    (a, b)
}

#[test]
fn test_raw_write_policy() {
    let mut rng = SmallRng::seed_from_u64(3);
    let (num_a_rows, num_b_rows, width) = (6, 4, 32);

    let a = random_i16(&mut rng, num_a_rows * width, 50);
    let b = random_i16(&mut rng, num_b_rows * width, 50);
    let mut c = vec![0i32; num_a_rows * num_b_rows];

    let cb = Write::new(c.as_mut_ptr(), num_b_rows);
    unsafe { multiply_i16_with(&a, &b, &cb, num_a_rows, num_b_rows, width) };

    let exact = exact_dot_products(&a, &b, num_a_rows, num_b_rows, width);
    for (idx, &total) in exact.iter().enumerate() {
        assert_eq!(c[idx] as i64, total, "cell {}", idx);
    }
}

#[test]
fn test_add_bias_policy() {
    // Reduced value 10 plus bias 5 writes 15.
    let (a, b) = single_lane_inputs(&[10], 32);
    let bias = vec![5i32];
    let mut c = vec![0i32; 1];

    let cb = AddBiasAndWrite::new(bias.as_ptr(), c.as_mut_ptr(), 1);
    unsafe { multiply_i16_with(&a, &b, &cb, 1, 1, 32) };

    assert_eq!(c[0], 15);
}

#[test]
fn test_unquantize_policy() {
    // Reduced value 20 times 0.5 writes 10.0.
    let (a, b) = single_lane_inputs(&[20], 32);
    let mut c = vec![0.0f32; 1];

    let cb = UnquantizeAndWrite::new(0.5, c.as_mut_ptr(), 1);
    unsafe { multiply_i16_with(&a, &b, &cb, 1, 1, 32) };

    assert_eq!(c[0], 10.0);
}

#[test]
fn test_unquantize_add_bias_policy() {
    let (a, b) = single_lane_inputs(&[20, -8], 32);
    let bias = vec![1.5f32];
    let mut c = vec![0.0f32; 2];

    let cb = UnquantizeAndAddBiasAndWrite::new(0.5, bias.as_ptr(), c.as_mut_ptr(), 1);
    unsafe { multiply_i16_with(&a, &b, &cb, 2, 1, 32) };

    assert_eq!(c, vec![11.5, -2.5]);
}

#[test]
fn test_discard_policy_runs() {
    let mut rng = SmallRng::seed_from_u64(4);
    let a = random_i8(&mut rng, 9 * 64, 32);
    let b = random_i8(&mut rng, 4 * 64, 32);

    unsafe { multiply_i8_with(&a, &b, &Discard, 9, 4, 64) };
}

// ============================================================
// Every cell written exactly once
// ============================================================

struct CountingCallback {
    counts: RefCell<Vec<u32>>,
    row_stride: usize,
}

impl OutputCallback for CountingCallback {
    unsafe fn write(&self, _total: i32, row: usize, col: usize) {
        self.counts.borrow_mut()[row * self.row_stride + col] += 1;
    }
}

#[test]
fn test_each_cell_written_exactly_once() {
    let mut rng = SmallRng::seed_from_u64(5);
    let width = 64;

    for num_a_rows in 1..=17 {
        for num_b_rows in B_ROW_CASES {
            let a = random_i8(&mut rng, num_a_rows * width, 16);
            let b = random_i8(&mut rng, num_b_rows * width, 16);

            let cb = CountingCallback {
                counts: RefCell::new(vec![0; num_a_rows * num_b_rows]),
                row_stride: num_b_rows,
            };
            unsafe { multiply_i8_with(&a, &b, &cb, num_a_rows, num_b_rows, width) };

            let counts = cb.counts.into_inner();
            for (idx, &n) in counts.iter().enumerate() {
                assert_eq!(
                    n, 1,
                    "{}x{}: cell {} written {} times",
                    num_a_rows, num_b_rows, idx, n
                );
            }
        }
    }
}

// ============================================================
// Precondition violations panic
// ============================================================

#[test]
#[should_panic(expected = "width must be a multiple of 32")]
fn test_i16_rejects_bad_width() {
    let a = AlignedVector::<i16>::new(16);
    let b = AlignedVector::<i16>::new(16);
    let mut c = vec![0.0f32; 1];
    multiply_i16(&a, &b, &mut c, 1.0, 1, 1, 16);
}

#[test]
#[should_panic(expected = "width must be a multiple of 64")]
fn test_i8_rejects_bad_width() {
    let a = AlignedVector::<i8>::new(32);
    let b = AlignedVector::<i8>::new(32);
    let mut c = vec![0.0f32; 1];
    multiply_i8(&a, &b, &mut c, 1.0, 1, 1, 32);
}

#[test]
#[should_panic]
fn test_i16_rejects_wrong_output_size() {
    let a = AlignedVector::<i16>::new(32);
    let b = AlignedVector::<i16>::new(32);
    let mut c = vec![0.0f32; 3]; // should be 1
    multiply_i16(&a, &b, &mut c, 1.0, 1, 1, 32);
}
