use alloc::vec::Vec;

use crate::arith;
use crate::error::ConvertError;
use crate::limits::Limits;
use crate::pixel::PixelLayout;

/// Largest width or height any adapter will accept.
pub const MAX_DIMENSION: u32 = i32::MAX as u32;

/// Check a `(width, height, channels)` triple.
///
/// True iff both dimensions are in `1..=i32::MAX` and `channels` is 3 or 4.
pub fn validate_dimensions(width: u32, height: u32, channels: u8) -> bool {
    (1..=MAX_DIMENSION).contains(&width)
        && (1..=MAX_DIMENSION).contains(&height)
        && PixelLayout::from_channels(channels).is_some()
}

/// An owned RGB or RGBA image: `height` rows of `width * channels` bytes,
/// top-to-bottom, with no padding between rows.
///
/// The length of [`pixels`](Self::pixels) is always exactly
/// `row_stride() * height`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    layout: PixelLayout,
}

impl PixelBuffer {
    /// Allocate a zero-filled buffer after validating the dimensions,
    /// the pixel budget, and the total byte count.
    ///
    /// Every decoder in this crate obtains its output through this call.
    pub fn allocate(
        width: u32,
        height: u32,
        layout: PixelLayout,
        limits: &Limits,
    ) -> Result<Self, ConvertError> {
        if !validate_dimensions(width, height, layout.channels()) {
            return Err(ConvertError::InvalidHeader(alloc::format!(
                "invalid dimensions {width}x{height}"
            )));
        }
        let row_stride = arith::row_stride(width, height, layout.bytes_per_pixel())?;
        if row_stride == 0 {
            return Err(ConvertError::DimensionsTooLarge { width, height });
        }
        limits.check_pixel_budget(width, height)?;
        let total = arith::buffer_len(width, height, row_stride)?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(total)
            .map_err(|_| ConvertError::AllocationFailed { bytes: total })?;
        pixels.resize(total, 0);

        Ok(Self {
            pixels,
            width,
            height,
            layout,
        })
    }

    /// Wrap caller-provided pixels. The length must match the dimensions exactly.
    pub fn from_pixels(
        width: u32,
        height: u32,
        layout: PixelLayout,
        pixels: Vec<u8>,
    ) -> Result<Self, ConvertError> {
        if !validate_dimensions(width, height, layout.channels()) {
            return Err(ConvertError::InvalidHeader(alloc::format!(
                "invalid dimensions {width}x{height}"
            )));
        }
        let row_stride = arith::row_stride(width, height, layout.bytes_per_pixel())?;
        let expected = arith::buffer_len(width, height, row_stride)?;
        if pixels.len() != expected {
            return Err(ConvertError::BufferSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            pixels,
            width,
            height,
            layout,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// 3 for RGB, 4 for RGBA.
    pub fn channels(&self) -> u8 {
        self.layout.channels()
    }

    /// Bytes per row.
    pub fn row_stride(&self) -> usize {
        // Validated at construction; cannot overflow.
        self.width as usize * self.layout.bytes_per_pixel()
    }

    /// Number of pixels (`width * height`).
    pub fn pixel_count(&self) -> usize {
        self.pixels.len() / self.layout.bytes_per_pixel()
    }

    /// Access the pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable access to the pixel data. The length cannot change.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> core::slice::ChunksExact<'_, u8> {
        self.pixels.chunks_exact(self.row_stride())
    }

    /// Take ownership of the pixel data.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// View as typed RGB pixels. Returns `None` unless the layout is `Rgb8`.
    #[cfg(feature = "rgb")]
    pub fn as_rgb(&self) -> Option<&[rgb::RGB8]> {
        use rgb::FromSlice as _;
        (self.layout == PixelLayout::Rgb8).then(|| self.pixels.as_rgb())
    }

    /// View as typed RGBA pixels. Returns `None` unless the layout is `Rgba8`.
    #[cfg(feature = "rgb")]
    pub fn as_rgba(&self) -> Option<&[rgb::RGBA8]> {
        use rgb::FromSlice as _;
        (self.layout == PixelLayout::Rgba8).then(|| self.pixels.as_rgba())
    }
}
