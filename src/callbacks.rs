//! Output callbacks: what happens to a reduced dot product.
//!
//! The kernels compute raw `i32` dot-product totals. A callback decides how
//! each total reaches the output buffer: stored as-is, scaled back to float
//! by the quantization multiplier, offset by a per-column bias, or dropped
//! entirely (benchmarking). Kernels are generic over the callback so the
//! policy is monomorphized into the inner loop - no dynamic dispatch on the
//! hot path.
//!
//! Callbacks are plain parameter bundles constructed once per multiply call.
//! They hold raw pointers into the caller-owned output (and bias) buffers;
//! the row stride is `num_b_rows` because C is `num_a_rows x num_b_rows`
//! row-major.

/// Receives reduced dot-product totals and writes the output matrix.
///
/// `row` and `col` address the output cell C\[row, col\]; implementations
/// index their buffer as `row * row_stride + col`. `write_quad` covers four
/// consecutive rows of the same column (the kernels reduce four accumulators
/// at a time), `write_pair` two. The defaults just loop over `write`.
///
/// # Safety
///
/// The caller of a kernel must guarantee every (row, col) the kernel
/// produces is in bounds for the buffers the callback was built with.
pub trait OutputCallback {
    unsafe fn write(&self, total: i32, row: usize, col: usize);

    #[inline(always)]
    unsafe fn write_pair(&self, totals: [i32; 2], row: usize, col: usize) {
        unsafe {
            self.write(totals[0], row, col);
            self.write(totals[1], row + 1, col);
        }
    }

    #[inline(always)]
    unsafe fn write_quad(&self, totals: [i32; 4], row: usize, col: usize) {
        unsafe {
            for (r, &total) in totals.iter().enumerate() {
                self.write(total, row + r, col);
            }
        }
    }
}

/// Throws the totals away. Used to benchmark the arithmetic without the
/// store traffic, and by tests that only care that a kernel runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct Discard;

impl OutputCallback for Discard {
    #[inline(always)]
    unsafe fn write(&self, _total: i32, _row: usize, _col: usize) {}
}

/// Stores the raw `i32` totals, for integer-typed output matrices.
#[derive(Clone, Copy, Debug)]
pub struct Write {
    output: *mut i32,
    row_stride: usize,
}

impl Write {
    pub fn new(output: *mut i32, row_stride: usize) -> Self {
        Self { output, row_stride }
    }
}

impl OutputCallback for Write {
    #[inline(always)]
    unsafe fn write(&self, total: i32, row: usize, col: usize) {
        unsafe { *self.output.add(row * self.row_stride + col) = total }
    }
}

/// Scales each total by the dequantization multiplier and stores `f32`.
///
/// This is the policy behind [`crate::multiply_i16`] and
/// [`crate::multiply_i8`].
#[derive(Clone, Copy, Debug)]
pub struct UnquantizeAndWrite {
    unquant_mult: f32,
    output: *mut f32,
    row_stride: usize,
}

impl UnquantizeAndWrite {
    pub fn new(unquant_mult: f32, output: *mut f32, row_stride: usize) -> Self {
        Self { unquant_mult, output, row_stride }
    }
}

impl OutputCallback for UnquantizeAndWrite {
    #[inline(always)]
    unsafe fn write(&self, total: i32, row: usize, col: usize) {
        unsafe {
            *self.output.add(row * self.row_stride + col) = self.unquant_mult * total as f32;
        }
    }
}

/// Adds a per-column integer bias and stores `i32`.
#[derive(Clone, Copy, Debug)]
pub struct AddBiasAndWrite {
    bias: *const i32,
    output: *mut i32,
    row_stride: usize,
}

impl AddBiasAndWrite {
    pub fn new(bias: *const i32, output: *mut i32, row_stride: usize) -> Self {
        Self { bias, output, row_stride }
    }
}

impl OutputCallback for AddBiasAndWrite {
    #[inline(always)]
    unsafe fn write(&self, total: i32, row: usize, col: usize) {
        unsafe {
            *self.output.add(row * self.row_stride + col) = total + *self.bias.add(col);
        }
    }
}

/// Dequantizes, adds a per-column float bias, stores `f32`.
#[derive(Clone, Copy, Debug)]
pub struct UnquantizeAndAddBiasAndWrite {
    unquant_mult: f32,
    bias: *const f32,
    output: *mut f32,
    row_stride: usize,
}

impl UnquantizeAndAddBiasAndWrite {
    pub fn new(unquant_mult: f32, bias: *const f32, output: *mut f32, row_stride: usize) -> Self {
        Self { unquant_mult, bias, output, row_stride }
    }
}

impl OutputCallback for UnquantizeAndAddBiasAndWrite {
    #[inline(always)]
    unsafe fn write(&self, total: i32, row: usize, col: usize) {
        unsafe {
            *self.output.add(row * self.row_stride + col) =
                self.unquant_mult * total as f32 + *self.bias.add(col);
        }
    }
}
