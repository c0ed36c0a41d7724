//! # zenconvert
//!
//! Convert raster images between formats through an owned RGB/RGBA
//! [`PixelBuffer`].
//!
//! ## Formats
//!
//! - **QOI**: built-in lossless codec (always available)
//! - **BMP**: uncompressed 24/32-bit read, 24-bit write (`bmp` feature, default)
//! - **PNG**, **JPEG**, **WebP**, **TIFF**: delegated to the `image` crate
//!   (`png`, `jpeg`, `webp`, `tiff` features)
//! - **AVIF**, **HEIF**, **JPEG XL**: recognized by name and magic bytes only
//!
//! ## Resource limits
//!
//! Every decoder allocates its output through [`PixelBuffer::allocate`],
//! which checks `width * height` against [`Limits::max_pixels`] and sizes
//! the buffer with overflow-checked arithmetic. File reads check
//! [`Limits::max_bytes`] before decoding starts.
//!
//! ## Non-Goals
//!
//! - Color management / ICC profiles
//! - Animated or multi-frame images
//! - A command-line front end (build one on [`ConvertRequest`])
//!
//! ## Usage
//!
//! ```
//! use zenconvert::{Limits, PixelBuffer, PixelLayout};
//!
//! let pixels = vec![10, 20, 30].repeat(16);
//! let image = PixelBuffer::from_pixels(4, 4, PixelLayout::Rgb8, pixels)?;
//!
//! let qoi = zenconvert::encode_qoi(&image)?;
//! let decoded = zenconvert::decode_qoi(&qoi, &Limits::default())?;
//! assert_eq!(decoded, image);
//! # Ok::<(), zenconvert::ConvertError>(())
//! ```

#![forbid(unsafe_code)]

extern crate alloc;

pub mod arith;
mod buffer;
mod convert;
mod error;
mod format;
mod info;
mod limits;
mod pixel;
pub mod qoi;

#[cfg(feature = "bmp")]
mod bmp;

#[cfg(feature = "delegate")]
mod delegate;

use alloc::vec::Vec;

// Re-exports
pub use buffer::{MAX_DIMENSION, PixelBuffer, validate_dimensions};
pub use convert::{ConvertOutcome, ConvertRequest, DEFAULT_QUALITY, read, write};
pub use error::ConvertError;
pub use format::ImageFormat;
pub use info::ImageInfo;
pub use limits::{DEFAULT_MAX_BYTES, DEFAULT_MAX_PIXELS, Limits};
pub use pixel::PixelLayout;
pub use qoi::QoiHeader;

/// Decode QOI data to an RGB8 or RGBA8 buffer.
pub fn decode_qoi(data: &[u8], limits: &Limits) -> Result<PixelBuffer, ConvertError> {
    qoi::decode(data, limits).map(|(_, buffer)| buffer)
}

/// Decode QOI data, also returning the parsed header (including the
/// colorspace tag, which decoding otherwise ignores).
pub fn decode_qoi_with_header(
    data: &[u8],
    limits: &Limits,
) -> Result<(QoiHeader, PixelBuffer), ConvertError> {
    qoi::decode(data, limits)
}

/// Encode a pixel buffer as QOI.
pub fn encode_qoi(buffer: &PixelBuffer) -> Result<Vec<u8>, ConvertError> {
    qoi::encode(buffer)
}

/// Decode an uncompressed 24-bit or 32-bit BMP.
#[cfg(feature = "bmp")]
pub fn decode_bmp(data: &[u8], limits: &Limits) -> Result<PixelBuffer, ConvertError> {
    bmp::decode(data, limits)
}

/// Encode a pixel buffer as a 24-bit BMP. Alpha is dropped.
#[cfg(feature = "bmp")]
pub fn encode_bmp(buffer: &PixelBuffer) -> Result<Vec<u8>, ConvertError> {
    bmp::encode(buffer)
}
