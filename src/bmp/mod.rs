//! Uncompressed BMP decoder and encoder (internal).
//!
//! Reads 24-bit RGB and 32-bit RGBA images in either row order; writes
//! 24-bit bottom-up images. Use top-level [`crate::decode_bmp`] and
//! [`crate::encode_bmp`].

mod decode;
mod encode;

use alloc::vec::Vec;

use crate::buffer::PixelBuffer;
use crate::error::ConvertError;
use crate::info::ImageInfo;
use crate::limits::Limits;

/// Probe header for ImageInfo without decoding.
pub(crate) fn probe_header(data: &[u8]) -> Result<ImageInfo, ConvertError> {
    let header = decode::parse_bmp_header(data)?;
    Ok(ImageInfo {
        width: header.width,
        height: header.height,
        format: crate::ImageFormat::Bmp,
        layout: header.layout,
    })
}

/// Decode BMP data (output in RGB/RGBA byte order).
pub(crate) fn decode(data: &[u8], limits: &Limits) -> Result<PixelBuffer, ConvertError> {
    let header = decode::parse_bmp_header(data)?;
    let buffer = decode::decode_bmp_pixels(data, &header, limits)?;
    log::debug!(
        "bmp: decoded {}x{} {}-bit (top_down={})",
        header.width,
        header.height,
        header.bits_per_pixel,
        header.top_down
    );
    Ok(buffer)
}

/// Encode to 24-bit BMP.
pub(crate) fn encode(buffer: &PixelBuffer) -> Result<Vec<u8>, ConvertError> {
    if buffer.layout().has_alpha() {
        log::debug!("bmp: dropping alpha channel");
    }
    encode::encode_bmp(buffer)
}
