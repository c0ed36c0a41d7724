use crate::error::ConvertError;
use crate::format::ImageFormat;
use crate::pixel::PixelLayout;

/// Image metadata read from a header without decoding pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// Layout a decode would produce.
    pub layout: PixelLayout,
}

impl ImageInfo {
    /// Probe QOI or BMP header bytes.
    ///
    /// Other formats are identified by [`ImageFormat::detect`] but cannot
    /// be probed here; they report [`ConvertError::UnsupportedFormat`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, ConvertError> {
        match ImageFormat::detect(data) {
            Some(ImageFormat::Qoi) => {
                let header = crate::qoi::parse_header(data)?;
                Ok(ImageInfo {
                    width: header.width,
                    height: header.height,
                    format: ImageFormat::Qoi,
                    layout: header.layout,
                })
            }
            #[cfg(feature = "bmp")]
            Some(ImageFormat::Bmp) => crate::bmp::probe_header(data),
            Some(other) => Err(ConvertError::UnsupportedFormat(other)),
            None => Err(ConvertError::UnrecognizedFormat),
        }
    }

    /// `width * height`, widened so it cannot overflow.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}
