//! BMP decoder: uncompressed 24-bit and 32-bit, bottom-up or top-down.

use crate::arith;
use crate::buffer::{MAX_DIMENSION, PixelBuffer};
use crate::error::ConvertError;
use crate::limits::Limits;
use crate::pixel::PixelLayout;

/// File header (14) + BITMAPINFOHEADER (40).
pub(crate) const BMP_HEADER_SIZE: usize = 54;

/// Fields of the file and info headers that decoding needs.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BmpHeader {
    pub width: u32,
    pub height: u32,
    pub top_down: bool,
    pub bits_per_pixel: u16,
    pub data_offset: usize,
    pub layout: PixelLayout,
}

fn le_u16(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn le_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn le_i32(data: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

/// Parse the BMP headers.
pub(crate) fn parse_bmp_header(data: &[u8]) -> Result<BmpHeader, ConvertError> {
    if data.len() < 2 || &data[0..2] != b"BM" {
        return Err(ConvertError::UnrecognizedFormat);
    }
    if data.len() < BMP_HEADER_SIZE {
        return Err(ConvertError::UnexpectedEof);
    }

    let data_offset = le_u32(data, 10) as usize;
    let info_size = le_u32(data, 14);
    if info_size < 40 {
        return Err(ConvertError::UnsupportedVariant(alloc::format!(
            "BMP info header size {info_size}"
        )));
    }
    let raw_width = le_i32(data, 18);
    let raw_height = le_i32(data, 22);
    let bits_per_pixel = le_u16(data, 28);
    let compression = le_u32(data, 30);

    if compression != 0 {
        return Err(ConvertError::UnsupportedVariant(alloc::format!(
            "BMP compression {compression}"
        )));
    }
    let layout = match bits_per_pixel {
        24 => PixelLayout::Rgb8,
        32 => PixelLayout::Rgba8,
        other => {
            return Err(ConvertError::UnsupportedVariant(alloc::format!(
                "BMP bit depth {other}"
            )));
        }
    };
    if raw_width <= 0 || raw_height == 0 || raw_height == i32::MIN {
        return Err(ConvertError::InvalidHeader(alloc::format!(
            "BMP dimensions {raw_width}x{raw_height}"
        )));
    }

    let width = raw_width.unsigned_abs();
    let height = raw_height.unsigned_abs();
    debug_assert!(width <= MAX_DIMENSION && height <= MAX_DIMENSION);

    Ok(BmpHeader {
        width,
        height,
        top_down: raw_height < 0,
        bits_per_pixel,
        data_offset,
        layout,
    })
}

/// Decode pixel rows into an allocated buffer, converting BGR(A) to RGB(A).
pub(crate) fn decode_bmp_pixels(
    data: &[u8],
    header: &BmpHeader,
    limits: &Limits,
) -> Result<PixelBuffer, ConvertError> {
    let (width, height) = (header.width, header.height);
    // Budget first, so an oversized header reports the limit rather than
    // its missing pixel data.
    limits.check_pixel_budget(width, height)?;

    // Source rows are padded to 4-byte boundaries.
    let src_bpp = usize::from(header.bits_per_pixel / 8);
    let raw_row = arith::row_stride(width, height, src_bpp)?;
    let src_stride = arith::checked_add(raw_row, 3)
        .map(|r| r & !3)
        .ok_or(ConvertError::DimensionsTooLarge { width, height })?;
    let src_len = arith::buffer_len(width, height, src_stride)?;
    let src_end = arith::checked_add(header.data_offset, src_len)
        .ok_or(ConvertError::DimensionsTooLarge { width, height })?;
    let src = data
        .get(header.data_offset..src_end)
        .ok_or(ConvertError::UnexpectedEof)?;

    let mut buffer = PixelBuffer::allocate(width, height, header.layout, limits)?;
    let dst_stride = buffer.row_stride();
    let dst_bpp = header.layout.bytes_per_pixel();
    let h = height as usize;
    for (y, src_row) in src.chunks_exact(src_stride).enumerate() {
        let dst_y = if header.top_down { y } else { h - 1 - y };
        let dst_row = &mut buffer.pixels_mut()[dst_y * dst_stride..(dst_y + 1) * dst_stride];
        for (dst, px) in dst_row
            .chunks_exact_mut(dst_bpp)
            .zip(src_row[..raw_row].chunks_exact(src_bpp))
        {
            dst[0] = px[2];
            dst[1] = px[1];
            dst[2] = px[0];
            if dst_bpp == 4 {
                dst[3] = px[3];
            }
        }
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bmp32(width: i32, height: i32, pixels: &[u8]) -> Vec<u8> {
        let mut out = vec![0u8; BMP_HEADER_SIZE];
        out[0..2].copy_from_slice(b"BM");
        out[2..6].copy_from_slice(&((BMP_HEADER_SIZE + pixels.len()) as u32).to_le_bytes());
        out[10..14].copy_from_slice(&(BMP_HEADER_SIZE as u32).to_le_bytes());
        out[14..18].copy_from_slice(&40u32.to_le_bytes());
        out[18..22].copy_from_slice(&width.to_le_bytes());
        out[22..26].copy_from_slice(&height.to_le_bytes());
        out[26..28].copy_from_slice(&1u16.to_le_bytes());
        out[28..30].copy_from_slice(&32u16.to_le_bytes());
        out.extend_from_slice(pixels);
        out
    }

    #[test]
    fn top_down_32bit_keeps_alpha() {
        // BGRA, rows top to bottom.
        let data = bmp32(1, -2, &[3, 2, 1, 200, 6, 5, 4, 100]);
        let header = parse_bmp_header(&data).unwrap();
        assert!(header.top_down);
        let buffer = decode_bmp_pixels(&data, &header, &Limits::default()).unwrap();
        assert_eq!(buffer.layout(), PixelLayout::Rgba8);
        assert_eq!(buffer.pixels(), &[1, 2, 3, 200, 4, 5, 6, 100]);
    }

    #[test]
    fn bottom_up_rows_are_flipped() {
        let data = bmp32(1, 2, &[3, 2, 1, 200, 6, 5, 4, 100]);
        let header = parse_bmp_header(&data).unwrap();
        let buffer = decode_bmp_pixels(&data, &header, &Limits::default()).unwrap();
        assert_eq!(buffer.pixels(), &[4, 5, 6, 100, 1, 2, 3, 200]);
    }

    #[test]
    fn rejects_compressed_and_odd_depths() {
        let mut data = bmp32(1, 1, &[0; 4]);
        data[30..34].copy_from_slice(&1u32.to_le_bytes());
        assert!(matches!(
            parse_bmp_header(&data),
            Err(ConvertError::UnsupportedVariant(_))
        ));

        let mut data = bmp32(1, 1, &[0; 4]);
        data[28..30].copy_from_slice(&8u16.to_le_bytes());
        assert!(matches!(
            parse_bmp_header(&data),
            Err(ConvertError::UnsupportedVariant(_))
        ));
    }

    #[test]
    fn budget_and_length_checked_before_allocating() {
        let limits = Limits::none().with_max_pixels(100);

        // Header only, over budget: the limit is reported.
        let data = bmp32(20, 20, &[]);
        let header = parse_bmp_header(&data).unwrap();
        let err = decode_bmp_pixels(&data, &header, &limits).unwrap_err();
        assert!(err.is_limit_exceeded(), "{err:?}");

        // Within budget but missing pixel data.
        let data = bmp32(10, 10, &[0; 40]);
        let header = parse_bmp_header(&data).unwrap();
        assert!(matches!(
            decode_bmp_pixels(&data, &header, &limits),
            Err(ConvertError::UnexpectedEof)
        ));

        // Huge declared size with no data fails without reserving memory.
        let data = bmp32(40_000, 40_000, &[]);
        let header = parse_bmp_header(&data).unwrap();
        assert!(matches!(
            decode_bmp_pixels(&data, &header, &Limits::none()),
            Err(ConvertError::UnexpectedEof | ConvertError::DimensionsTooLarge { .. })
        ));
    }

    #[test]
    fn rejects_bad_dimensions() {
        for (w, h) in [(0, 1), (-1, 1), (1, 0), (1, i32::MIN)] {
            let data = bmp32(w, h, &[0; 4]);
            assert!(matches!(
                parse_bmp_header(&data),
                Err(ConvertError::InvalidHeader(_))
            ));
        }
    }
}
