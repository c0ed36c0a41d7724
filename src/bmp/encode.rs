//! BMP encoder: uncompressed 24-bit, bottom-up. Alpha is dropped.

use alloc::vec::Vec;

use super::decode::BMP_HEADER_SIZE;
use crate::arith;
use crate::buffer::PixelBuffer;
use crate::error::ConvertError;

/// Encode a pixel buffer as a 24-bit BMP.
pub(crate) fn encode_bmp(buffer: &PixelBuffer) -> Result<Vec<u8>, ConvertError> {
    let (width, height) = (buffer.width(), buffer.height());
    let too_large = || ConvertError::DimensionsTooLarge { width, height };

    let raw_row = arith::row_stride(width, height, 3)?;
    let row_stride = arith::checked_add(raw_row, 3)
        .map(|r| r & !3)
        .ok_or_else(too_large)?;
    let pixel_data_size = arith::buffer_len(width, height, row_stride)?;
    let file_size = arith::checked_add(pixel_data_size, BMP_HEADER_SIZE).ok_or_else(too_large)?;
    // Both sizes are stored as u32 in the header.
    if u32::try_from(file_size).is_err() {
        return Err(too_large());
    }

    let mut out = Vec::new();
    out.try_reserve_exact(file_size)
        .map_err(|_| ConvertError::AllocationFailed { bytes: file_size })?;
    write_bmp_header(&mut out, file_size, pixel_data_size, width, height);

    let pad_bytes = row_stride - raw_row;
    let src_bpp = buffer.layout().bytes_per_pixel();
    for row in buffer.rows().rev() {
        for px in row.chunks_exact(src_bpp) {
            out.push(px[2]);
            out.push(px[1]);
            out.push(px[0]);
        }
        out.extend(core::iter::repeat_n(0u8, pad_bytes));
    }

    Ok(out)
}

fn write_bmp_header(
    out: &mut Vec<u8>,
    file_size: usize,
    pixel_data_size: usize,
    width: u32,
    height: u32,
) {
    // File header (14 bytes)
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&[0u8; 4]); // reserved
    out.extend_from_slice(&(BMP_HEADER_SIZE as u32).to_le_bytes()); // data offset

    // DIB header (BITMAPINFOHEADER, 40 bytes)
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes()); // positive = bottom-up
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // compression
    out.extend_from_slice(&(pixel_data_size as u32).to_le_bytes());
    out.extend_from_slice(&2835u32.to_le_bytes()); // h resolution (72 DPI)
    out.extend_from_slice(&2835u32.to_le_bytes()); // v resolution
    out.extend_from_slice(&0u32.to_le_bytes()); // colors used
    out.extend_from_slice(&0u32.to_le_bytes()); // important colors
}
