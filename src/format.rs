//! Image formats and per-format read/write dispatch.

use alloc::vec::Vec;
use std::path::Path;

use crate::buffer::PixelBuffer;
use crate::error::ConvertError;
use crate::limits::Limits;

/// Every format the converter knows by name.
///
/// QOI (and BMP with the `bmp` feature) are implemented natively. PNG,
/// JPEG, WebP and TIFF are delegated to external codecs behind their Cargo
/// features. AVIF, HEIF and JPEG XL are recognized but have no adapter.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Bmp,
    Qoi,
    Tiff,
    WebP,
    Avif,
    Heif,
    Jxl,
}

impl ImageFormat {
    /// All known formats, in help-text order.
    pub const ALL: [ImageFormat; 9] = [
        ImageFormat::Png,
        ImageFormat::Jpeg,
        ImageFormat::Bmp,
        ImageFormat::Qoi,
        ImageFormat::Tiff,
        ImageFormat::WebP,
        ImageFormat::Avif,
        ImageFormat::Heif,
        ImageFormat::Jxl,
    ];

    /// Look up a format by name or file extension (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extensions().contains(&lower.as_str()))
    }

    /// Format implied by a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_name)
    }

    /// Detect format from magic bytes. Returns `None` if unrecognized.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"qoif") {
            return Some(ImageFormat::Qoi);
        }
        if data.starts_with(b"BM") {
            return Some(ImageFormat::Bmp);
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.starts_with(b"II*\0") || data.starts_with(b"MM\0*") {
            return Some(ImageFormat::Tiff);
        }
        if data.len() >= 12 && data[..4] == *b"RIFF" && data[8..12] == *b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        if data.len() >= 12 && data[4..8] == *b"ftyp" {
            return match &data[8..12] {
                b"avif" | b"avis" => Some(ImageFormat::Avif),
                b"heic" | b"heix" | b"mif1" | b"msf1" => Some(ImageFormat::Heif),
                _ => None,
            };
        }
        // JPEG XL codestream or container
        if data.starts_with(&[0xFF, 0x0A])
            || data.starts_with(&[0, 0, 0, 0x0C, b'J', b'X', b'L', b' ', 0x0D, 0x0A, 0x87, 0x0A])
        {
            return Some(ImageFormat::Jxl);
        }
        None
    }

    /// Accepted names and extensions; the first is canonical.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ImageFormat::Png => &["png"],
            ImageFormat::Jpeg => &["jpg", "jpeg"],
            ImageFormat::Bmp => &["bmp"],
            ImageFormat::Qoi => &["qoi"],
            ImageFormat::Tiff => &["tiff", "tif"],
            ImageFormat::WebP => &["webp"],
            ImageFormat::Avif => &["avif"],
            ImageFormat::Heif => &["heic", "heif"],
            ImageFormat::Jxl => &["jxl"],
        }
    }

    /// Whether an adapter for this format is compiled in.
    pub fn is_supported(self) -> bool {
        match self {
            ImageFormat::Qoi => true,
            ImageFormat::Bmp => cfg!(feature = "bmp"),
            ImageFormat::Png => cfg!(feature = "png"),
            ImageFormat::Jpeg => cfg!(feature = "jpeg"),
            ImageFormat::WebP => cfg!(feature = "webp"),
            ImageFormat::Tiff => cfg!(feature = "tiff"),
            ImageFormat::Avif | ImageFormat::Heif | ImageFormat::Jxl => false,
        }
    }

    /// Whether writing this format keeps an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, ImageFormat::Jpeg | ImageFormat::Bmp)
    }

    /// Whether the quality hint affects the output.
    pub fn is_lossy(self) -> bool {
        matches!(
            self,
            ImageFormat::Jpeg | ImageFormat::Avif | ImageFormat::Heif | ImageFormat::Jxl
        )
    }

    /// Decode in-memory file bytes with this format's adapter.
    pub fn decode(self, data: &[u8], limits: &Limits) -> Result<PixelBuffer, ConvertError> {
        match self {
            ImageFormat::Qoi => crate::qoi::decode(data, limits).map(|(_, buffer)| buffer),
            #[cfg(feature = "bmp")]
            ImageFormat::Bmp => crate::bmp::decode(data, limits),
            #[cfg(feature = "delegate")]
            ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP | ImageFormat::Tiff
                if self.is_supported() =>
            {
                crate::delegate::decode(data, self, limits)
            }
            other => Err(ConvertError::UnsupportedFormat(other)),
        }
    }

    /// Encode a pixel buffer with this format's adapter.
    ///
    /// `quality` (1..=100) is only used by lossy formats.
    #[cfg_attr(not(feature = "delegate"), allow(unused_variables))]
    pub fn encode(self, buffer: &PixelBuffer, quality: u8) -> Result<Vec<u8>, ConvertError> {
        match self {
            ImageFormat::Qoi => crate::qoi::encode(buffer),
            #[cfg(feature = "bmp")]
            ImageFormat::Bmp => crate::bmp::encode(buffer),
            #[cfg(feature = "delegate")]
            ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP | ImageFormat::Tiff
                if self.is_supported() =>
            {
                crate::delegate::encode(buffer, self, quality)
            }
            other => Err(ConvertError::UnsupportedFormat(other)),
        }
    }
}
