//! QOI decoder over an in-memory byte slice.

use super::{
    ColorCache, QOI_END_MARKER, QOI_HEADER_SIZE, QOI_MAGIC, QOI_MASK_2, QOI_OP_DIFF,
    QOI_OP_INDEX, QOI_OP_LUMA, QOI_OP_RGB, QOI_OP_RGBA, QOI_START_PIXEL, QoiHeader,
};
use crate::buffer::MAX_DIMENSION;
use crate::error::ConvertError;
use crate::pixel::PixelLayout;

/// Parse and validate the 14-byte header.
pub(crate) fn parse_header(data: &[u8]) -> Result<QoiHeader, ConvertError> {
    let header: &[u8; QOI_HEADER_SIZE] = data
        .get(..QOI_HEADER_SIZE)
        .and_then(|h| h.try_into().ok())
        .ok_or(ConvertError::UnexpectedEof)?;

    let magic = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    if magic != QOI_MAGIC {
        return Err(ConvertError::InvalidHeader("bad QOI magic".into()));
    }
    let width = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    let height = u32::from_be_bytes([header[8], header[9], header[10], header[11]]);
    if width == 0 || height == 0 {
        return Err(ConvertError::InvalidHeader(alloc::format!(
            "QOI dimensions {width}x{height} contain zero"
        )));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ConvertError::InvalidHeader(alloc::format!(
            "QOI dimensions {width}x{height} out of range"
        )));
    }
    let layout = PixelLayout::from_channels(header[12]).ok_or_else(|| {
        ConvertError::InvalidHeader(alloc::format!("QOI channel count {}", header[12]))
    })?;

    Ok(QoiHeader {
        width,
        height,
        layout,
        colorspace: header[13],
    })
}

/// Byte cursor; every read reports truncation as `UnexpectedEof`.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    fn byte(&mut self) -> Result<u8, ConvertError> {
        let b = *self.data.get(self.pos).ok_or(ConvertError::UnexpectedEof)?;
        self.pos += 1;
        Ok(b)
    }

    #[inline]
    fn array<const N: usize>(&mut self) -> Result<[u8; N], ConvertError> {
        let bytes: [u8; N] = self
            .data
            .get(self.pos..)
            .and_then(|rest| rest.get(..N))
            .and_then(|s| s.try_into().ok())
            .ok_or(ConvertError::UnexpectedEof)?;
        self.pos += N;
        Ok(bytes)
    }

    fn remaining(&self) -> &'a [u8] {
        self.data.get(self.pos..).unwrap_or(&[])
    }
}

/// Decode the instruction stream (everything after the header) into `out`.
///
/// `out` must be sized `width * height * channels`; decoding stops once it
/// is full. Fails if the stream ends first.
pub(crate) fn decode_pixels(
    stream: &[u8],
    layout: PixelLayout,
    out: &mut [u8],
) -> Result<(), ConvertError> {
    let channels = layout.bytes_per_pixel();
    let end = out.len();
    let mut reader = Reader::new(stream);
    let mut cache = ColorCache::new();
    let mut px = QOI_START_PIXEL;
    let mut pos = 0usize;

    while pos < end {
        let b1 = reader.byte()?;

        if b1 == QOI_OP_RGB {
            let [r, g, b] = reader.array::<3>()?;
            px = [r, g, b, px[3]];
        } else if b1 == QOI_OP_RGBA {
            px = reader.array::<4>()?;
        } else {
            match b1 & QOI_MASK_2 {
                QOI_OP_INDEX => px = cache.get(b1),
                QOI_OP_DIFF => {
                    px[0] = px[0].wrapping_add((b1 >> 4) & 0x03).wrapping_sub(2);
                    px[1] = px[1].wrapping_add((b1 >> 2) & 0x03).wrapping_sub(2);
                    px[2] = px[2].wrapping_add(b1 & 0x03).wrapping_sub(2);
                }
                QOI_OP_LUMA => {
                    let b2 = reader.byte()?;
                    let vg = (b1 & 0x3f).wrapping_sub(32);
                    px[0] = px[0]
                        .wrapping_add(vg)
                        .wrapping_add(b2 >> 4)
                        .wrapping_sub(8);
                    px[1] = px[1].wrapping_add(vg);
                    px[2] = px[2]
                        .wrapping_add(vg)
                        .wrapping_add(b2 & 0x0f)
                        .wrapping_sub(8);
                }
                _ => {
                    // Run: repeat the previous pixel, clamped to what is left.
                    let run = usize::from(b1 & 0x3f) + 1;
                    for _ in 0..run {
                        if pos >= end {
                            break;
                        }
                        write_pixel(out, pos, &px[..channels])?;
                        pos += channels;
                    }
                    continue;
                }
            }
        }

        cache.insert(px);
        write_pixel(out, pos, &px[..channels])?;
        pos += channels;
    }

    if reader.remaining().get(..QOI_END_MARKER.len()) != Some(&QOI_END_MARKER[..]) {
        log::debug!("qoi: end marker missing after final pixel");
    }
    Ok(())
}

#[inline]
fn write_pixel(out: &mut [u8], pos: usize, px: &[u8]) -> Result<(), ConvertError> {
    out.get_mut(pos..pos + px.len())
        .ok_or_else(|| ConvertError::InvalidData("QOI output cursor overrun".into()))?
        .copy_from_slice(px);
    Ok(())
}
