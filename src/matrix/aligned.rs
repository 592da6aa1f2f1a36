//! 64-byte-aligned heap buffers.

use std::alloc::{Layout, alloc_zeroed, dealloc, handle_alloc_error};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

/// Alignment required for kernel input matrices, in bytes.
///
/// One full 512-bit register; also a cache line, so rows laid out at the
/// required width multiples never straddle one.
pub const ALIGNMENT: usize = 64;

/// A fixed-length, zero-initialized, 64-byte-aligned buffer.
///
/// `Vec` makes no alignment promise beyond the element type's, and the
/// kernels assert 64-byte bases, so quantized matrices should live in one
/// of these. Derefs to a slice for everything else.
///
/// ```
/// use intmatmul::matrix::aligned::AlignedVector;
///
/// let mut a = AlignedVector::<i16>::new(4 * 32);
/// a[0] = 7;
/// assert_eq!(a.as_ptr() as usize % 64, 0);
/// assert_eq!(a.len(), 128);
/// ```
pub struct AlignedVector<T> {
    ptr: NonNull<T>,
    len: usize,
}

impl<T: Copy> AlignedVector<T> {
    /// Allocates `len` zeroed elements. `T` must be a plain integer or
    /// float type (all-zero bytes are a valid value).
    pub fn new(len: usize) -> Self {
        if len == 0 {
            return Self { ptr: NonNull::dangling(), len: 0 };
        }
        let layout = Self::layout(len);
        let raw = unsafe { alloc_zeroed(layout) };
        let Some(ptr) = NonNull::new(raw as *mut T) else {
            handle_alloc_error(layout)
        };
        Self { ptr, len }
    }

    /// Allocates an aligned copy of `vals`.
    pub fn from_slice(vals: &[T]) -> Self {
        let mut buf = Self::new(vals.len());
        buf.copy_from_slice(vals);
        buf
    }

    fn layout(len: usize) -> Layout {
        Layout::from_size_align(len * size_of::<T>(), ALIGNMENT).unwrap()
    }
}

impl<T> AlignedVector<T> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Deref for AlignedVector<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> DerefMut for AlignedVector<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> Drop for AlignedVector<T> {
    fn drop(&mut self) {
        if self.len > 0 {
            let layout = Layout::from_size_align(self.len * size_of::<T>(), ALIGNMENT).unwrap();
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) };
        }
    }
}

// The buffer uniquely owns its allocation, like a Vec.
unsafe impl<T: Send> Send for AlignedVector<T> {}
unsafe impl<T: Sync> Sync for AlignedVector<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_and_zeroing() {
        for len in [1, 31, 32, 64, 1000] {
            let buf = AlignedVector::<i8>::new(len);
            assert_eq!(buf.as_ptr() as usize % ALIGNMENT, 0);
            assert_eq!(buf.len(), len);
            assert!(buf.iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn test_from_slice() {
        let vals: Vec<i16> = (0..96).map(|i| i - 48).collect();
        let buf = AlignedVector::from_slice(&vals);
        assert_eq!(&buf[..], &vals[..]);
        assert_eq!(buf.as_ptr() as usize % ALIGNMENT, 0);
    }

    #[test]
    fn test_empty() {
        let buf = AlignedVector::<f32>::new(0);
        assert!(buf.is_empty());
    }
}
