//! File-level read/write and the conversion driver.

use std::fs::{self, File};
use std::io::Read as _;
use std::path::{Path, PathBuf};

use crate::buffer::PixelBuffer;
use crate::error::ConvertError;
use crate::format::ImageFormat;
use crate::limits::Limits;
use crate::pixel::PixelLayout;

/// Quality used for lossy output when none is given.
pub const DEFAULT_QUALITY: u8 = 85;

/// Read and decode an image file.
///
/// The file size is checked against `limits.max_bytes` before anything is
/// read, and again on the bytes actually read.
pub fn read(
    path: impl AsRef<Path>,
    format: ImageFormat,
    limits: &Limits,
) -> Result<PixelBuffer, ConvertError> {
    let path = path.as_ref();
    let data = read_limited(path, limits)?;
    format.decode(&data, limits)
}

fn read_limited(path: &Path, limits: &Limits) -> Result<Vec<u8>, ConvertError> {
    let mut file = File::open(path)?;
    let metadata = file.metadata()?;
    if metadata.is_file() {
        limits.check_input_size(metadata.len())?;
    }

    let mut data = Vec::new();
    match limits.max_bytes {
        // One byte past the ceiling is enough to tell the file is too large,
        // even if it grew after the metadata check or has no size at all.
        Some(max_bytes) => {
            file.take(max_bytes.saturating_add(1)).read_to_end(&mut data)?;
        }
        None => {
            file.read_to_end(&mut data)?;
        }
    }
    limits.check_input_size(data.len() as u64)?;
    Ok(data)
}

/// Encode and write an image file.
///
/// The whole file is encoded in memory first, so an encode failure never
/// touches `path`. If writing fails part-way, the partial file is removed.
pub fn write(
    path: impl AsRef<Path>,
    format: ImageFormat,
    buffer: &PixelBuffer,
    quality: u8,
) -> Result<u64, ConvertError> {
    let path = path.as_ref();
    let encoded = format.encode(buffer, quality.clamp(1, 100))?;
    if let Err(e) = fs::write(path, &encoded) {
        if let Err(remove_err) = fs::remove_file(path) {
            if remove_err.kind() != std::io::ErrorKind::NotFound {
                log::warn!(
                    "could not remove partial output {}: {remove_err}",
                    path.display()
                );
            }
        }
        return Err(e.into());
    }
    Ok(encoded.len() as u64)
}

/// What a successful conversion did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConvertOutcome {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub input_format: ImageFormat,
    pub output_format: ImageFormat,
    pub bytes_written: u64,
}

/// Convert one image file into another format.
///
/// ```no_run
/// use zenconvert::{ConvertRequest, ImageFormat, Limits};
///
/// let outcome = ConvertRequest::new("photo.png", "photo.out")
///     .with_format(ImageFormat::Qoi)
///     .with_limits(Limits::default().with_max_pixels(50_000_000))
///     .convert()?;
/// println!("{}x{}", outcome.width, outcome.height);
/// # Ok::<(), zenconvert::ConvertError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ConvertRequest {
    input: PathBuf,
    output: PathBuf,
    output_format: Option<ImageFormat>,
    quality: u8,
    limits: Limits,
}

impl ConvertRequest {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            output_format: None,
            quality: DEFAULT_QUALITY,
            limits: Limits::default(),
        }
    }

    /// Force the output format instead of using the output extension.
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Lossy quality, clamped to `1..=100`.
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Read the input, then write it in the output format.
    pub fn convert(&self) -> Result<ConvertOutcome, ConvertError> {
        let output_format = match self.output_format {
            Some(f) => f,
            None => ImageFormat::from_path(&self.output).ok_or_else(|| {
                ConvertError::UnknownFormat(alloc::format!(
                    "cannot detect output format of {}",
                    self.output.display()
                ))
            })?,
        };
        if !output_format.is_supported() {
            return Err(ConvertError::UnsupportedFormat(output_format));
        }

        let data = read_limited(&self.input, &self.limits)?;
        let input_format = ImageFormat::from_path(&self.input)
            .or_else(|| ImageFormat::detect(&data))
            .ok_or_else(|| {
                ConvertError::UnknownFormat(alloc::format!(
                    "cannot detect input format of {}",
                    self.input.display()
                ))
            })?;
        log::debug!(
            "converting {} ({input_format:?}) -> {} ({output_format:?})",
            self.input.display(),
            self.output.display()
        );

        let buffer = input_format.decode(&data, &self.limits)?;
        drop(data);
        let bytes_written = write(&self.output, output_format, &buffer, self.quality)?;

        Ok(ConvertOutcome {
            width: buffer.width(),
            height: buffer.height(),
            layout: buffer.layout(),
            input_format,
            output_format,
            bytes_written,
        })
    }
}
