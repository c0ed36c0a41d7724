//! Overflow-checked size arithmetic.
//!
//! Every byte count or pixel count derived from header-declared dimensions
//! goes through these helpers. They never panic and never wrap.

use crate::error::ConvertError;

/// Exact `a * b`, or `None` if the product does not fit in `usize`.
#[inline]
pub fn checked_mul(a: usize, b: usize) -> Option<usize> {
    a.checked_mul(b)
}

/// Exact `a + b`, or `None` if the sum does not fit in `usize`.
#[inline]
pub fn checked_add(a: usize, b: usize) -> Option<usize> {
    a.checked_add(b)
}

/// `width * height`.
pub(crate) fn pixel_count(width: u32, height: u32) -> Result<usize, ConvertError> {
    checked_mul(width as usize, height as usize)
        .ok_or(ConvertError::DimensionsTooLarge { width, height })
}

/// Bytes per row: `width * bytes_per_pixel`.
pub(crate) fn row_stride(width: u32, height: u32, bpp: usize) -> Result<usize, ConvertError> {
    checked_mul(width as usize, bpp).ok_or(ConvertError::DimensionsTooLarge { width, height })
}

/// Total bytes for `height` rows of `row_stride` bytes.
pub(crate) fn buffer_len(
    width: u32,
    height: u32,
    row_stride: usize,
) -> Result<usize, ConvertError> {
    checked_mul(row_stride, height as usize)
        .ok_or(ConvertError::DimensionsTooLarge { width, height })
}
