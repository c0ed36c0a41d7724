//! QOI ("Quite OK Image") decoder and encoder.
//!
//! A QOI file is a 14-byte header, a stream of byte-tagged instructions, and
//! an 8-byte end marker. Both directions keep the same running state: the
//! previous pixel and a 64-slot cache of recently seen colors indexed by
//! [`qoi_hash`].

mod decode;
mod encode;

use alloc::vec::Vec;

use crate::buffer::PixelBuffer;
use crate::error::ConvertError;
use crate::limits::Limits;
use crate::pixel::PixelLayout;

pub(crate) const QOI_OP_INDEX: u8 = 0x00;
pub(crate) const QOI_OP_DIFF: u8 = 0x40;
pub(crate) const QOI_OP_LUMA: u8 = 0x80;
pub(crate) const QOI_OP_RUN: u8 = 0xc0;
pub(crate) const QOI_OP_RGB: u8 = 0xfe;
pub(crate) const QOI_OP_RGBA: u8 = 0xff;
pub(crate) const QOI_MASK_2: u8 = 0xc0;

/// `"qoif"` read as a big-endian u32.
pub const QOI_MAGIC: u32 = 0x716f_6966;
pub const QOI_HEADER_SIZE: usize = 14;
pub const QOI_END_MARKER: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

/// Longest run a single run instruction can encode.
pub(crate) const QOI_MAX_RUN: u8 = 62;

/// Pixel value before the first instruction of every stream.
pub(crate) const QOI_START_PIXEL: [u8; 4] = [0, 0, 0, 255];

/// Cache slot for a color: `(r*3 + g*5 + b*7 + a*11) % 64`.
#[inline]
pub fn qoi_hash(px: [u8; 4]) -> usize {
    let [r, g, b, a] = px.map(usize::from);
    (r * 3 + g * 5 + b * 7 + a * 11) % 64
}

/// Fixed 64-slot table of recently seen colors. A collision overwrites.
#[derive(Clone, Debug)]
pub(crate) struct ColorCache([[u8; 4]; 64]);

impl ColorCache {
    pub(crate) fn new() -> Self {
        Self([[0; 4]; 64])
    }

    /// The color stored at `index & 0x3f`.
    #[inline]
    pub(crate) fn get(&self, index: u8) -> [u8; 4] {
        self.0[usize::from(index & 0x3f)]
    }

    /// Whether `px` is what its slot currently holds. Returns the slot.
    #[inline]
    pub(crate) fn lookup(&self, px: [u8; 4]) -> (usize, bool) {
        let slot = qoi_hash(px);
        (slot, self.0[slot] == px)
    }

    #[inline]
    pub(crate) fn insert(&mut self, px: [u8; 4]) {
        self.0[qoi_hash(px)] = px;
    }
}

/// Parsed QOI header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QoiHeader {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    /// Raw colorspace tag. Carried through, never interpreted.
    pub colorspace: u8,
}

impl QoiHeader {
    /// Colorspace tag for linear channels.
    pub const COLORSPACE_LINEAR: u8 = 0;
    /// Colorspace tag for sRGB. The encoder always writes this value.
    pub const COLORSPACE_SRGB: u8 = 1;

    pub(crate) fn to_bytes(self) -> [u8; QOI_HEADER_SIZE] {
        let mut out = [0u8; QOI_HEADER_SIZE];
        out[0..4].copy_from_slice(&QOI_MAGIC.to_be_bytes());
        out[4..8].copy_from_slice(&self.width.to_be_bytes());
        out[8..12].copy_from_slice(&self.height.to_be_bytes());
        out[12] = self.layout.channels();
        out[13] = self.colorspace;
        out
    }
}

/// Parse and validate a QOI header without allocating pixel memory.
pub(crate) fn parse_header(data: &[u8]) -> Result<QoiHeader, ConvertError> {
    decode::parse_header(data)
}

/// Decode QOI data to RGB8 or RGBA8 pixels, keeping the header.
pub(crate) fn decode(
    data: &[u8],
    limits: &Limits,
) -> Result<(QoiHeader, PixelBuffer), ConvertError> {
    let header = decode::parse_header(data)?;
    let pixel_count = limits.check_pixel_budget(header.width, header.height)?;

    // One instruction byte yields at most 62 pixels, so a stream shorter
    // than this cannot fill the image. Reject it before allocating.
    let stream = &data[QOI_HEADER_SIZE..];
    if stream.len() < pixel_count.div_ceil(usize::from(QOI_MAX_RUN)) {
        return Err(ConvertError::UnexpectedEof);
    }

    let mut buffer = PixelBuffer::allocate(header.width, header.height, header.layout, limits)?;
    decode::decode_pixels(stream, buffer.layout(), buffer.pixels_mut())?;
    log::debug!(
        "qoi: decoded {}x{} {:?} from {} bytes",
        header.width,
        header.height,
        header.layout,
        data.len()
    );
    Ok((header, buffer))
}

/// Encode a pixel buffer as QOI.
pub(crate) fn encode(buffer: &PixelBuffer) -> Result<Vec<u8>, ConvertError> {
    let out = encode::encode_qoi(buffer)?;
    log::debug!(
        "qoi: encoded {}x{} {:?} to {} bytes",
        buffer.width(),
        buffer.height(),
        buffer.layout(),
        out.len()
    );
    Ok(out)
}
