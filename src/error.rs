use alloc::string::String;

use crate::format::ImageFormat;

/// Errors from reading, writing, and converting images.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConvertError {
    #[error("unrecognized format magic bytes")]
    UnrecognizedFormat,

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("unsupported format variant: {0}")]
    UnsupportedVariant(String),

    #[error("invalid pixel data: {0}")]
    InvalidData(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("failed to allocate {bytes} bytes")]
    AllocationFailed { bytes: usize },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("pixel buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("unknown image format: {0}")]
    UnknownFormat(String),

    #[error("{0:?} support is not compiled in")]
    UnsupportedFormat(ImageFormat),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "delegate")]
    #[error("codec error: {0}")]
    Codec(#[from] image::ImageError),
}

impl ConvertError {
    /// Whether this error came from a configured resource ceiling
    /// (`max_pixels` or `max_bytes`) rather than from bad input.
    pub fn is_limit_exceeded(&self) -> bool {
        matches!(self, ConvertError::LimitExceeded(_))
    }

    /// Whether the input bytes themselves are malformed.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            ConvertError::UnrecognizedFormat
                | ConvertError::InvalidHeader(_)
                | ConvertError::UnsupportedVariant(_)
                | ConvertError::InvalidData(_)
                | ConvertError::UnexpectedEof
        )
    }
}
