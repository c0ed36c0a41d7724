//! Adapters for formats whose codecs live in the `image` crate.
//!
//! The external decoder does the work; this module reads the header once,
//! enforces the pixel budget before any pixels are decoded, and fills a
//! buffer obtained from [`PixelBuffer::allocate`].

use alloc::vec::Vec;
use std::io::Cursor;

use image::{ColorType, DynamicImage, ExtendedColorType, ImageDecoder, ImageEncoder as _};

use crate::buffer::PixelBuffer;
use crate::error::ConvertError;
use crate::format::ImageFormat;
use crate::limits::Limits;
use crate::pixel::PixelLayout;

/// Decode with the external codec into RGB8 or RGBA8.
#[cfg_attr(
    not(any(feature = "png", feature = "jpeg", feature = "webp", feature = "tiff")),
    allow(unused_variables)
)]
pub(crate) fn decode(
    data: &[u8],
    format: ImageFormat,
    limits: &Limits,
) -> Result<PixelBuffer, ConvertError> {
    let cursor = Cursor::new(data);
    match format {
        #[cfg(feature = "png")]
        ImageFormat::Png => {
            decode_with(image::codecs::png::PngDecoder::new(cursor)?, format, limits)
        }
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => {
            decode_with(image::codecs::jpeg::JpegDecoder::new(cursor)?, format, limits)
        }
        #[cfg(feature = "webp")]
        ImageFormat::WebP => {
            decode_with(image::codecs::webp::WebPDecoder::new(cursor)?, format, limits)
        }
        #[cfg(feature = "tiff")]
        ImageFormat::Tiff => {
            decode_with(image::codecs::tiff::TiffDecoder::new(cursor)?, format, limits)
        }
        other => Err(ConvertError::UnsupportedFormat(other)),
    }
}

/// One pass over the file: header, budget check, then pixels.
///
/// 8-bit RGB and RGBA sources are read straight into the allocated buffer.
/// Anything else is decoded by the codec and converted, which briefly holds
/// both copies.
fn decode_with(
    decoder: impl ImageDecoder,
    format: ImageFormat,
    limits: &Limits,
) -> Result<PixelBuffer, ConvertError> {
    let (width, height) = decoder.dimensions();
    limits.check_pixel_budget(width, height)?;

    let buffer = match decoder.color_type() {
        ColorType::Rgb8 => read_direct(decoder, PixelLayout::Rgb8, format, limits)?,
        ColorType::Rgba8 => read_direct(decoder, PixelLayout::Rgba8, format, limits)?,
        _ => {
            let (layout, raw) = into_raw(DynamicImage::from_decoder(decoder)?);
            let mut buffer = PixelBuffer::allocate(width, height, layout, limits)?;
            check_len(format, raw.len() as u64, buffer.pixels().len())?;
            buffer.pixels_mut().copy_from_slice(&raw);
            buffer
        }
    };
    log::debug!("{format:?}: decoded {width}x{height} {:?}", buffer.layout());
    Ok(buffer)
}

fn read_direct(
    decoder: impl ImageDecoder,
    layout: PixelLayout,
    format: ImageFormat,
    limits: &Limits,
) -> Result<PixelBuffer, ConvertError> {
    let (width, height) = decoder.dimensions();
    let mut buffer = PixelBuffer::allocate(width, height, layout, limits)?;
    check_len(format, decoder.total_bytes(), buffer.pixels().len())?;
    decoder.read_image(buffer.pixels_mut())?;
    Ok(buffer)
}

fn check_len(format: ImageFormat, produced: u64, expected: usize) -> Result<(), ConvertError> {
    if produced != expected as u64 {
        return Err(ConvertError::InvalidData(alloc::format!(
            "{format:?} decoder produced {produced} bytes, expected {expected}"
        )));
    }
    Ok(())
}

fn into_raw(decoded: DynamicImage) -> (PixelLayout, Vec<u8>) {
    if decoded.color().has_alpha() {
        (PixelLayout::Rgba8, decoded.into_rgba8().into_raw())
    } else {
        (PixelLayout::Rgb8, decoded.into_rgb8().into_raw())
    }
}

fn color_type(layout: PixelLayout) -> ExtendedColorType {
    match layout {
        PixelLayout::Rgb8 => ExtendedColorType::Rgb8,
        PixelLayout::Rgba8 => ExtendedColorType::Rgba8,
    }
}

/// Encode with the external codec. `quality` only affects JPEG.
#[cfg_attr(not(feature = "jpeg"), allow(unused_variables))]
pub(crate) fn encode(
    buffer: &PixelBuffer,
    format: ImageFormat,
    quality: u8,
) -> Result<Vec<u8>, ConvertError> {
    let (width, height) = (buffer.width(), buffer.height());
    let color = color_type(buffer.layout());
    let mut out = Vec::new();

    match format {
        #[cfg(feature = "png")]
        ImageFormat::Png => {
            image::codecs::png::PngEncoder::new(&mut out).write_image(
                buffer.pixels(),
                width,
                height,
                color,
            )?;
        }
        #[cfg(feature = "jpeg")]
        ImageFormat::Jpeg => {
            let rgb = strip_alpha(buffer);
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality).write_image(
                &rgb,
                width,
                height,
                ExtendedColorType::Rgb8,
            )?;
        }
        #[cfg(feature = "webp")]
        ImageFormat::WebP => {
            // Only lossless WebP encoding is available.
            image::codecs::webp::WebPEncoder::new_lossless(&mut out).write_image(
                buffer.pixels(),
                width,
                height,
                color,
            )?;
        }
        #[cfg(feature = "tiff")]
        ImageFormat::Tiff => {
            let mut cursor = Cursor::new(&mut out);
            image::codecs::tiff::TiffEncoder::new(&mut cursor).write_image(
                buffer.pixels(),
                width,
                height,
                color,
            )?;
        }
        other => return Err(ConvertError::UnsupportedFormat(other)),
    }

    log::debug!("{format:?}: encoded {width}x{height} to {} bytes", out.len());
    Ok(out)
}

/// RGB copy of the buffer; borrows nothing if it is already RGB.
#[cfg(feature = "jpeg")]
fn strip_alpha(buffer: &PixelBuffer) -> alloc::borrow::Cow<'_, [u8]> {
    use alloc::borrow::Cow;
    match buffer.layout() {
        PixelLayout::Rgb8 => Cow::Borrowed(buffer.pixels()),
        PixelLayout::Rgba8 => Cow::Owned(
            buffer
                .pixels()
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect(),
        ),
    }
}
